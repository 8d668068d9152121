use iced::Event;

use crate::config::types::Config;
use crate::device::types::DeviceEvent;
use crate::engine::types::{EngineEvent, PatternKind};

#[derive(Debug, Clone)]
pub enum Message {
    EventOccurred(Event),
    ApplyDirtyConfig,
    WriteComplete(()),
    ConfigLoadComplete((Config, Option<String>)),
    ConfigSaveComplete(Option<String>),
    NoticeConfirmed,
    PowerToggled(bool),
    ConnectComplete(bool),
    IntensityChanged(u8), // slider position, 0-100
    PatternSelected(PatternKind),
    EngineEvent(EngineEvent),
    DeviceEvent(DeviceEvent),
}
