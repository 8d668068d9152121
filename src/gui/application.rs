use futures::SinkExt;
use iced::{Alignment, Application, Command, Element, Length, Settings, Size, Subscription, window};
use iced::event::{self, Event};
use iced::time::{every as iced_time_every};
use iced::theme::{self, Theme};
use iced::widget::{
    PickList, button, column, container, horizontal_rule, row, slider, text, toggler,
};
use std::time::Duration;
use log::{error, info, warn};
use tokio::task::spawn_blocking;
use tokio_util::sync::CancellationToken;

use crate::config::io::ConfigIO;
use crate::config::types::Config;
use crate::device::manager::DeviceManager;
use crate::device::status::connection_status_subscription;
use crate::device::types::{ConnectionType, DeviceEvent, DeviceState, MotorDevice};
use crate::engine::task::engine_subscription;
use crate::engine::types::{EngineCommand, EngineEvent, PATTERN_KINDS};
use crate::error::AppRunError;
use crate::gui::style;
use crate::gui::types::Message;

pub struct ApplicationFlags {
    config_io: ConfigIO,
}

pub struct MyApplication {
    // this token is cancelled upon exit
    app_cancel: CancellationToken,

    // messages that the user must click away
    notices: Vec<String>,

    // current config, might not be saved to disk yet
    config_io: ConfigIO,
    config: Config,
    config_dirty: bool,
    // this flag is used to make sure that a user is not spammed with save configuration errors
    displayed_config_save_error: bool,

    // the one hid connection to the controller, shared with the engine and
    // the status poll
    device: DeviceManager,

    // commands for the vibration engine; None until the engine task reports
    // in with EngineEvent::Ready
    engine: Option<futures::channel::mpsc::Sender<EngineCommand>>,

    // whether the user has vibration switched on
    power: bool,

    // latest state from the device and the engine
    latest_device_state: DeviceState,
    live_intensity: u8,
}

impl MyApplication {
    fn before_close(&mut self) {
        // todo: wait for the engine and status subscriptions to finish their
        // cleanup before the window actually closes
        self.app_cancel.cancel();
    }

    fn load_config(&self) -> Command<Message> {
        let config_io = self.config_io.clone();

        let fut = async move {
            match config_io.read().await {
                Ok(config) => (config, None),
                Err(err) => {
                    let mut error_message: Option<String> = None;

                    if err.is_file_not_found_error() {
                        // this is probably the first start of the app
                        info!("Config file not found, using defaults");
                    } else {
                        error!("Failed to load config: {:?}", &err);
                        error_message = Some(format!("Failed to load config: {}", &err));
                    }
                    (Config::default(), error_message)
                }
            }
        };

        Command::perform(fut, Message::ConfigLoadComplete)
    }

    fn save_config(&self) -> Command<Message> {
        let config = self.config;
        let config_io = self.config_io.clone();

        let fut = async move {
            match config_io.save(config).await {
                Ok(_) => None,
                Err(err) => {
                    error!("Failed to save config: {:?}", &err);
                    return Some(format!("Failed to save config: {}", &err));
                },
            }
        };

        return Command::perform(fut, Message::ConfigSaveComplete);
    }

    fn send_engine_command(&self, command: EngineCommand) -> Command<Message> {
        match &self.engine {
            Some(sender) => {
                let mut sender = sender.clone();

                let fut = async move {
                    sender.send(command).await
                        .expect("Failed to send EngineCommand");
                };

                Command::perform(fut, Message::WriteComplete)
            },
            None => Command::none(),
        }
    }

    fn start_engine(&self) -> Command<Message> {
        self.send_engine_command(EngineCommand::Start {
            intensity: self.config.motor_intensity(),
            pattern: self.config.pattern,
        })
    }

    fn connect_controller(&self) -> Command<Message> {
        let device = self.device.clone();

        let fut = async move {
            spawn_blocking(move || device.connect()).await
                .expect("Failed to join connect task")
        };

        Command::perform(fut, Message::ConnectComplete)
    }
}

impl Application for MyApplication {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ApplicationFlags;

    fn new(flags: ApplicationFlags) -> (MyApplication, Command<Self::Message>) {
        let app = MyApplication {
            app_cancel: CancellationToken::new(),
            notices: Vec::new(),
            config_io: flags.config_io,
            config: Config::default(),
            config_dirty: false,
            displayed_config_save_error: false,
            device: DeviceManager::new(),
            engine: None,
            power: false,
            latest_device_state: DeviceState::Initial,
            live_intensity: 0,
        };

        let command = app.load_config();
        (app, command)
    }

    fn title(&self) -> String {
        String::from(concat!("Dual Sensual ", env!("CARGO_PKG_VERSION")))
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn update(&mut self, message: Message) -> Command<Self::Message> {
        match message {
            Message::ConfigLoadComplete((config, error_message)) => {
                info!("Config load complete");
                self.config = config;
                if let Some(error_message) = error_message {
                    self.notices.push(error_message);
                }
            },
            Message::ApplyDirtyConfig => {
                if self.config_dirty {
                    self.config_dirty = false;
                    return self.save_config();
                }
            },
            Message::ConfigSaveComplete(error_message) => {
                if !self.displayed_config_save_error {
                    if let Some(error_message) = error_message {
                        self.displayed_config_save_error = true;
                        self.notices.push(error_message);
                    }
                }
            },
            Message::NoticeConfirmed => {
                if !self.notices.is_empty() {
                    self.notices.remove(0);
                }
            },
            Message::EventOccurred(Event::Window(id, window::Event::CloseRequested)) => {
                info!("Close requested");
                self.before_close();
                return window::close(id);
            },

            Message::PowerToggled(true) => {
                if self.engine.is_none() {
                    // the engine task has not reported in yet
                    return Command::none();
                }

                if self.device.is_connected() {
                    self.power = true;
                    return self.start_engine();
                }

                // try to connect first; the toggle only flips on success
                return self.connect_controller();
            },
            Message::PowerToggled(false) => {
                self.power = false;
                self.live_intensity = 0;
                return self.send_engine_command(EngineCommand::Stop);
            },
            Message::ConnectComplete(true) => {
                self.latest_device_state = DeviceState::Connected {
                    connection: self.device.connection_type(),
                };
                self.power = true;
                return self.start_engine();
            },
            Message::ConnectComplete(false) => {
                warn!("No controller found, leaving vibration off");
            },

            Message::IntensityChanged(percent) => {
                self.config.intensity_percent = percent;
                self.config_dirty = true;

                if self.power {
                    return self.send_engine_command(
                        EngineCommand::SetIntensity(self.config.motor_intensity())
                    );
                }
            },
            Message::PatternSelected(kind) => {
                self.config.pattern = kind;
                self.config_dirty = true;

                if self.power {
                    return self.send_engine_command(EngineCommand::SetPattern(kind));
                }
            },

            Message::EngineEvent(EngineEvent::Ready(sender)) => {
                self.engine = Some(sender);
            },
            Message::EngineEvent(EngineEvent::IntensityChanged(value)) => {
                self.live_intensity = value;
            },
            Message::EngineEvent(EngineEvent::Error(message)) => {
                // the engine has already stopped itself
                error!("Vibration engine error: {}", message);
                self.power = false;
                self.live_intensity = 0;
                self.notices.push(format!("Vibration stopped: {}", message));
            },

            Message::DeviceEvent(DeviceEvent::StateChange(state)) => {
                if !matches!(state, DeviceState::Connected { .. }) {
                    self.live_intensity = 0;
                }
                self.latest_device_state = state;
            },

            _ => {}
        }

        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            event::listen().map(Message::EventOccurred),
            iced_time_every(Duration::from_secs(1)).map(|_| Message::ApplyDirtyConfig),
            engine_subscription(
                self.app_cancel.clone(),
                self.device.clone(),
            ).map(Message::EngineEvent),
            connection_status_subscription(
                self.app_cancel.clone(),
                self.device.clone(),
            ).map(Message::DeviceEvent),
        ])
    }

    fn view(&self) -> Element<Message> {
        if let Some(notice) = self.notices.first() {
            return container(
                column![
                    text(notice),

                    button(text("Okay"))
                        .on_press(Message::NoticeConfirmed),

                ].align_items(Alignment::Center).spacing(20),
            )
            .width(Length::Fill)
            .padding(20)
            .into()
        }

        let connection = match &self.latest_device_state {
            DeviceState::Connected { connection } => *connection,
            _ => ConnectionType::None,
        };

        let (status_label, status_color) = match connection {
            ConnectionType::None => ("Disconnected", style::ERROR),
            _ => ("Connected", style::SUCCESS),
        };

        let mut status = column![
            row![
                text("Controller:"),
                text(status_label).style(theme::Text::Color(status_color)),
                text("\u{25cf}").style(theme::Text::Color(status_color)),
            ].spacing(10),

            row![
                text("Connection:"),
                text(connection.to_string()),
            ].spacing(10),
        ].spacing(8);

        if connection == ConnectionType::Bluetooth {
            status = status.push(
                text("Note: Full haptic control requires a USB connection.")
                    .size(12)
                    .style(theme::Text::Color(style::WARNING))
            );
        }

        let output_value = if self.power {
            format!("Output: {}", self.live_intensity)
        } else {
            String::new()
        };

        container(
            column![
                text("DUAL SENSUAL").size(28),

                horizontal_rule(10),

                status.width(Length::Fill),

                row![
                    toggler(Some("Power".to_string()), self.power, Message::PowerToggled)
                        .width(Length::Shrink)
                        .spacing(10),

                    text(output_value)
                        .style(theme::Text::Color(style::ACCENT)),
                ].spacing(30).align_items(Alignment::Center),

                column![
                    row![
                        text("Intensity").width(Length::Fill),
                        text(format!("{}%", self.config.intensity_percent)),
                    ],

                    slider(0..=100u8, self.config.intensity_percent, Message::IntensityChanged),
                ].spacing(10),

                column![
                    text("Vibration Pattern"),

                    PickList::new(
                        PATTERN_KINDS,
                        Some(self.config.pattern),
                        Message::PatternSelected,
                    ).width(Length::Fill),
                ].spacing(10),
            ]
                .spacing(30)
                .width(Length::Fill)
                .align_items(Alignment::Center),
        )
        .width(Length::Fill)
        .padding(30)
        .into()
    }
}

pub fn run_application() -> Result<(), AppRunError> {
    let mut config_io = ConfigIO::new_sync()?;
    let mut config_locker = config_io.locker()?;
    let _lock_guard = config_locker.lock()?;

    let flags = ApplicationFlags { config_io };
    let mut settings = Settings::with_flags(flags);

    // handle exits ourselves (Event::CloseRequested)
    settings.id = Some("dual-sensual".to_string());
    settings.window.exit_on_close_request = false;
    settings.window.size = Size::new(400.0, 600.0);
    settings.window.resizable = false;

    // this function will call process::exit() unless there was a startup error
    MyApplication::run(settings)?;
    Ok(())
}
