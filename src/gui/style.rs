use iced::Color;

// status colors, matching the connected/warning/disconnected scheme of the
// rest of the branding
pub const SUCCESS: Color = Color { r: 0.298, g: 0.686, b: 0.314, a: 1.0 }; // #4CAF50
pub const WARNING: Color = Color { r: 1.0, g: 0.655, b: 0.149, a: 1.0 }; // #FFA726
pub const ERROR: Color = Color { r: 0.937, g: 0.325, b: 0.314, a: 1.0 }; // #EF5350
pub const ACCENT: Color = Color { r: 0.718, g: 0.431, b: 0.475, a: 1.0 }; // #B76E79
