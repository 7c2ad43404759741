use clap::Parser;
use iced::widget::{
    button, canvas, checkbox, column, container, image, responsive, row, scrollable, stack, text,
    text_input, Column,
};
use iced::{Alignment, ContentFit, Element, Length, Task, Theme};
use iced_aw::Wrap;
use rfd::FileDialog;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod state;
mod ui;

use config::{ConfigError, Settings};
use state::data::{Classification, Pair, PairId, Subject, SubjectId};
use state::notify::{Level, NotificationCenter, Notifier};
use state::report::{self, ExportAction, PendingExport, ReportOptions, ReportSummary};
use state::session::{AdvanceTicket, ComparisonSession, SessionCursor};
use state::source;
use state::store::InspectionStore;
use ui::capture::CaptureRegistry;
use ui::overlay::{AnomalyOverlay, CoordinateSpace};
use ui::slider::{GestureSlider, SliderCanvas, SliderEvent};

/// Operation id for data set loading notifications
const OP_DATASET: &str = "dataset";

/// Operation id for settings file notifications
const OP_SETTINGS: &str = "settings";

/// Height of the comparison viewer
const VIEWER_HEIGHT: f32 = 600.0;

/// Command line flags
#[derive(Debug, Parser)]
#[command(name = "room-compare", version, about)]
struct Cli {
    /// Inspection data set (JSON array of subjects); demo data when omitted
    #[arg(long, env = "ROOM_COMPARE_DATA")]
    data: Option<PathBuf>,

    /// Open the comparison for this subject directly
    #[arg(long)]
    subject: Option<u32>,

    /// Start the comparison at this pair (with --subject)
    #[arg(long, requires = "subject")]
    pair: Option<u32>,

    /// Log filter, e.g. "debug" or "room_compare=trace"
    #[arg(long)]
    log: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Dashboard,
    Comparison,
    Report,
}

/// Main application state
struct RoomCompare {
    settings: Settings,
    /// All subjects and the active selection
    store: InspectionStore,
    /// Present while a subject with pairs is being compared
    session: Option<ComparisonSession>,
    slider: GestureSlider,
    captures: CaptureRegistry,
    notifications: NotificationCenter,
    screen: Screen,
    /// Comparison viewer fills the whole window
    fullscreen: bool,
    report_options: ReportOptions,
    recipient: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Open data set"
    OpenDataset,
    SelectSubject(SubjectId),
    ShowDashboard,
    ShowComparison,
    ShowReport,
    /// Pointer event from the comparison slider
    Slider(SliderEvent),
    Previous,
    Next,
    Classify(Classification),
    /// Auto-advance delay elapsed
    AutoAdvance(AdvanceTicket),
    NoteChanged(String),
    ToggleHeatmap,
    ToggleContours,
    ToggleFullscreen,
    IncludeHighRes(bool),
    IncludeHeatmaps(bool),
    HideCompliant(bool),
    RecipientChanged(String),
    Export(ExportAction),
    /// Simulated export finished
    ExportFinished { op: &'static str, message: String },
    DismissNotification(String),
}

impl RoomCompare {
    /// Create a new instance of the application
    fn new(
        cli: Cli,
        settings: Settings,
        settings_error: Option<ConfigError>,
    ) -> (Self, Task<Message>) {
        let mut notifications = NotificationCenter::default();

        if let Some(err) = settings_error {
            warn!(%err, "falling back to default settings");
            notifications.notify(OP_SETTINGS, Level::Error, err.to_string());
        }

        let subjects = match cli.data.as_ref().or(settings.dataset.as_ref()) {
            Some(path) => match source::load_subjects(path) {
                Ok(subjects) => subjects,
                Err(err) => {
                    notifications.notify(OP_DATASET, Level::Error, err.to_string());
                    source::demo_subjects()
                }
            },
            None => source::demo_subjects(),
        };

        let captures = CaptureRegistry::new();
        let mut app = RoomCompare {
            settings,
            store: InspectionStore::new(subjects),
            session: None,
            slider: GestureSlider::new(captures.clone()),
            captures,
            notifications,
            screen: Screen::Dashboard,
            fullscreen: false,
            report_options: ReportOptions::default(),
            recipient: String::new(),
        };

        let deep_linked = cli
            .subject
            .and_then(|id| app.store.select_subject(SubjectId(id)))
            .is_some();

        if deep_linked {
            app.open_comparison(cli.pair.map(PairId));
        } else {
            if let Some(id) = cli.subject {
                warn!(subject = id, "deep link does not match any subject");
            }
            app.store.select_first();
        }

        info!(subjects = app.store.len(), "Room Compare initialized");

        (app, Task::none())
    }

    /// Start comparing the active subject
    fn open_comparison(&mut self, deep_link: Option<PairId>) {
        self.close_comparison();
        self.session = self
            .store
            .active()
            .and_then(|subject| ComparisonSession::start(subject, deep_link));
        self.screen = Screen::Comparison;
    }

    /// Tear down the session and slider of the comparison screen
    fn close_comparison(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.teardown();
        }
        self.slider = GestureSlider::new(self.captures.clone());
        self.fullscreen = false;
        debug!(captures = self.captures.active(), "comparison closed");
    }

    fn load_dataset(&mut self, path: &Path) {
        match source::load_subjects(path) {
            Ok(subjects) => {
                self.close_comparison();
                self.store = InspectionStore::new(subjects);
                self.store.select_first();
                self.screen = Screen::Dashboard;
                self.notifications.notify(
                    OP_DATASET,
                    Level::Success,
                    format!("Loaded {} subjects from {}", self.store.len(), path.display()),
                );
            }
            Err(err) => {
                self.notifications.notify(OP_DATASET, Level::Error, err.to_string());
            }
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenDataset => {
                let file = FileDialog::new()
                    .set_title("Open inspection data set")
                    .add_filter("Inspection data", &["json"])
                    .pick_file();

                if let Some(path) = file {
                    self.load_dataset(&path);
                }
            }
            Message::SelectSubject(id) => {
                if self.store.select_subject(id).is_some() {
                    self.open_comparison(None);
                }
            }
            Message::ShowDashboard => {
                self.close_comparison();
                self.screen = Screen::Dashboard;
            }
            Message::ShowComparison => {
                if self.screen != Screen::Comparison {
                    self.open_comparison(None);
                }
            }
            Message::ShowReport => {
                self.close_comparison();
                self.screen = Screen::Report;
            }
            Message::Slider(event) => self.slider.handle(event),
            Message::Previous => {
                if let Some(session) = self.session.as_mut() {
                    session.go_previous();
                }
            }
            Message::Next => {
                if let Some(session) = self.session.as_mut() {
                    session.go_next();
                }
            }
            Message::Classify(status) => {
                let Some(session) = self.session.as_mut() else {
                    return Task::none();
                };

                if let Some(ticket) =
                    session.classify(&mut self.store, status, &mut self.notifications)
                {
                    let delay = self.settings.auto_advance_delay();
                    return Task::perform(
                        async move { tokio::time::sleep(delay).await },
                        move |_| Message::AutoAdvance(ticket),
                    );
                }
            }
            Message::AutoAdvance(ticket) => {
                if let Some(session) = self.session.as_mut() {
                    session.fire_auto_advance(ticket);
                }
            }
            Message::NoteChanged(note) => {
                if let Some(session) = self.session.as_mut() {
                    session.set_draft_note(note);
                }
            }
            Message::ToggleHeatmap => {
                if let Some(session) = self.session.as_mut() {
                    session.toggle_heatmap();
                }
            }
            Message::ToggleContours => {
                if let Some(session) = self.session.as_mut() {
                    session.toggle_contours();
                }
            }
            Message::ToggleFullscreen => {
                if self.session.is_some() {
                    self.fullscreen = !self.fullscreen;
                }
            }
            Message::IncludeHighRes(value) => self.report_options.include_high_res = value,
            Message::IncludeHeatmaps(value) => self.report_options.include_heatmaps = value,
            Message::HideCompliant(value) => self.report_options.hide_compliant = value,
            Message::RecipientChanged(recipient) => self.recipient = recipient,
            Message::Export(action) => {
                let pending = action.start(
                    self.settings.pdf_delay(),
                    self.settings.email_delay(),
                    &mut self.notifications,
                );

                if let Some(PendingExport { op, delay, message }) = pending {
                    return Task::perform(
                        async move {
                            tokio::time::sleep(delay).await;
                            message
                        },
                        move |message| Message::ExportFinished { op, message },
                    );
                }
            }
            Message::ExportFinished { op, message } => {
                self.notifications.notify(op, Level::Success, message);
            }
            Message::DismissNotification(op) => self.notifications.dismiss(&op),
        }

        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        if self.fullscreen && self.screen == Screen::Comparison {
            if let Some(view) = self.view_fullscreen() {
                return view;
            }
        }

        let nav = row![
            text("Room Compare").size(28),
            button("Properties")
                .on_press(Message::ShowDashboard)
                .style(nav_style(self.screen == Screen::Dashboard)),
            button("Comparison")
                .on_press(Message::ShowComparison)
                .style(nav_style(self.screen == Screen::Comparison)),
            button("Report")
                .on_press(Message::ShowReport)
                .style(nav_style(self.screen == Screen::Report)),
            button("Open data set")
                .on_press(Message::OpenDataset)
                .style(button::secondary),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let body = match self.screen {
            Screen::Dashboard => self.view_dashboard(),
            Screen::Comparison => self.view_comparison(),
            Screen::Report => self.view_report(),
        };

        let content: Column<Message> = column![nav, self.view_notifications(), body]
            .spacing(20)
            .padding(24);

        container(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn view_notifications(&self) -> Element<Message> {
        let toasts = self.notifications.entries().map(|notification| {
            let style = match notification.level {
                Level::Loading => button::secondary,
                Level::Success => button::success,
                Level::Error => button::danger,
            };
            button(text(notification.message.clone()).size(14))
                .on_press(Message::DismissNotification(notification.op.clone()))
                .style(style)
                .into()
        });

        Column::with_children(toasts).spacing(6).into()
    }

    fn view_dashboard(&self) -> Element<Message> {
        let cards: Vec<Element<Message>> = self
            .store
            .subjects()
            .map(|subject| {
                let card = column![
                    text(subject.address.clone()).size(16),
                    text(format!(
                        "{} - score {}/100",
                        subject.status.label(),
                        subject.conformity_score
                    ))
                    .size(13),
                    text(format!(
                        "{} / {} rooms classified",
                        subject.classified_count(),
                        subject.pairs.len()
                    ))
                    .size(13),
                    text(format!(
                        "Move-in {}  Move-out {}",
                        subject.entry_date.format("%d/%m/%Y"),
                        subject.exit_date.format("%d/%m/%Y")
                    ))
                    .size(12),
                ]
                .spacing(6)
                .width(260);

                button(card)
                    .on_press(Message::SelectSubject(subject.id))
                    .style(button::secondary)
                    .padding(16)
                    .into()
            })
            .collect();

        if self.store.is_empty() {
            return text("No properties in this data set.").into();
        }

        Wrap::with_elements(cards).spacing(16.0).line_spacing(16.0).into()
    }

    fn view_comparison(&self) -> Element<Message> {
        let Some(session) = self.session.as_ref() else {
            return column![
                text("No photo pairs to compare yet."),
                button("Back to properties").on_press(Message::ShowDashboard),
            ]
            .spacing(12)
            .align_x(Alignment::Center)
            .into();
        };
        let Some(pair) = session.current_pair(&self.store) else {
            return text("This property is no longer selected.").into();
        };
        let cursor = session.cursor();
        let address = self
            .store
            .get(session.subject_id())
            .map(|subject| subject.address.as_str())
            .unwrap_or_default();

        let header = row![
            button("<").on_press_maybe(session.can_go_previous().then_some(Message::Previous)),
            text(format!(
                "{} ({}/{})",
                pair.room,
                session.index() + 1,
                session.len()
            ))
            .size(20),
            button(">").on_press_maybe(session.can_go_next().then_some(Message::Next)),
            text(address).size(14),
        ]
        .push_maybe(
            session
                .has_pending_advance()
                .then(|| text("Moving to the next room...").size(13)),
        )
        .spacing(12)
        .align_y(Alignment::Center);

        let controls = row![
            text(format!(
                "Sharpness {}/5   Lighting {}/5   Angle {}/5",
                pair.quality.sharpness, pair.quality.lighting, pair.quality.angle
            ))
            .size(14),
            button("Heatmap")
                .on_press(Message::ToggleHeatmap)
                .style(nav_style(cursor.show_heatmap)),
            button("Contours")
                .on_press(Message::ToggleContours)
                .style(nav_style(cursor.show_contours)),
            button("Fullscreen")
                .on_press(Message::ToggleFullscreen)
                .style(button::secondary),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let anomaly_list: Element<Message> = if pair.anomalies.is_empty() {
            text("No anomaly detected").size(14).into()
        } else {
            Column::with_children(pair.anomalies.iter().map(|anomaly| {
                row![
                    container(photo(anomaly.close_up(&pair.after), "Close-up"))
                        .width(Length::Fixed(96.0))
                        .height(Length::Fixed(72.0))
                        .clip(true),
                    column![
                        text(format!("{} ({:?})", anomaly.kind, anomaly.severity)).size(14),
                        text(anomaly.description.clone()).size(13),
                    ]
                    .spacing(2),
                ]
                .spacing(8)
                .align_y(Alignment::Center)
                .into()
            }))
            .spacing(8)
            .into()
        };

        let classify = Classification::ALL.iter().fold(column![].spacing(8), |buttons, &status| {
            let style = match status {
                Classification::Compliant => button::success,
                Classification::ToVerify => button::secondary,
                Classification::NonCompliant => button::danger,
            };
            let label = if pair.status == Some(status) {
                format!("Mark {status} (current)")
            } else {
                format!("Mark {status}")
            };
            buttons.push(
                button(text(label))
                    .on_press(Message::Classify(status))
                    .style(style)
                    .width(Length::Fill),
            )
        });

        let panel = column![
            text(format!("Conformity score: {}%", pair.score)).size(18),
            text(format!("Detected anomalies ({})", pair.anomalies.len())).size(16),
            anomaly_list,
            text("Classification").size(16),
            classify,
            text_input("+ Add a note (optional)", &cursor.draft_note)
                .on_input(Message::NoteChanged),
        ]
        .spacing(12)
        .width(Length::FillPortion(1));

        let main = column![
            container(self.viewer(pair, cursor)).height(Length::Fixed(VIEWER_HEIGHT)),
            controls
        ]
        .spacing(12)
        .width(Length::FillPortion(2));

        column![header, row![main, panel].spacing(24)]
            .spacing(16)
            .into()
    }

    /// Comparison viewer stretched over the whole window, outside the
    /// scrollable page so it can fill the height
    fn view_fullscreen(&self) -> Option<Element<Message>> {
        let session = self.session.as_ref()?;
        let pair = session.current_pair(&self.store)?;
        let cursor = session.cursor();

        let bar = row![
            button("<").on_press_maybe(session.can_go_previous().then_some(Message::Previous)),
            text(format!(
                "{} ({}/{})",
                pair.room,
                session.index() + 1,
                session.len()
            ))
            .size(18),
            button(">").on_press_maybe(session.can_go_next().then_some(Message::Next)),
            button("Heatmap")
                .on_press(Message::ToggleHeatmap)
                .style(nav_style(cursor.show_heatmap)),
            button("Contours")
                .on_press(Message::ToggleContours)
                .style(nav_style(cursor.show_contours)),
            button("Exit fullscreen").on_press(Message::ToggleFullscreen),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let content = column![
            bar,
            container(self.viewer(pair, cursor))
                .width(Length::Fill)
                .height(Length::Fill)
        ]
        .spacing(8)
        .padding(8);

        Some(
            container(content)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
        )
    }

    /// Photo stack with the revealed move-out side, anomaly overlay and
    /// slider handle
    fn viewer<'a>(&'a self, pair: &'a Pair, cursor: &SessionCursor) -> Element<'a, Message> {
        let split = self.slider.split();
        let slider = &self.slider;
        let (before, after) = (pair.before.as_str(), pair.after.as_str());
        let anomalies = pair.anomalies.as_slice();
        let space = CoordinateSpace::from(self.settings.overlay_reference);
        let (show_heatmap, show_contours) = (cursor.show_heatmap, cursor.show_contours);

        responsive(move |size| {
            let revealed = container(
                container(photo(after, "Move-out"))
                    .width(Length::Fixed(size.width))
                    .height(Length::Fill),
            )
            .width(Length::Fixed(size.width * split))
            .height(Length::Fill)
            .clip(true);

            let overlay = canvas(AnomalyOverlay {
                anomalies,
                space,
                show_heatmap,
                show_contours,
            })
            .width(Length::Fill)
            .height(Length::Fill);

            let handle = canvas(SliderCanvas { slider })
                .width(Length::Fill)
                .height(Length::Fill);

            stack![photo(before, "Move-in"), revealed, overlay, handle].into()
        })
        .into()
    }

    fn view_report(&self) -> Element<Message> {
        let Some(subject) = self.store.active() else {
            return text("Select a property to generate a report.").into();
        };
        let summary = ReportSummary::of(subject);
        let photos = if self.report_options.include_high_res {
            "high resolution"
        } else {
            "standard"
        };
        let heatmaps = if self.report_options.include_heatmaps {
            "included"
        } else {
            "not included"
        };

        let preview = column![
            text("Inspection Report").size(24),
            text(format!("Generated on {}", chrono::Local::now().format("%d/%m/%Y"))).size(13),
            text(subject.address.clone()),
            text(format!(
                "Move-in {}  Move-out {}  Overall score {}/100",
                subject.entry_date.format("%d/%m/%Y"),
                subject.exit_date.format("%d/%m/%Y"),
                subject.conformity_score
            ))
            .size(14),
            text(format!(
                "{} of {} rooms classified   {} anomalies detected",
                summary.classified(),
                subject.pairs.len(),
                summary.anomalies
            )),
            text(format!(
                "{} compliant   {} to verify   {} non-compliant   {} not classified",
                summary.compliant, summary.to_verify, summary.non_compliant, summary.unclassified
            )),
            text(format!("Photos: {photos}   Heatmaps: {heatmaps}")).size(13),
            room_details(subject, &self.report_options),
        ]
        .spacing(12)
        .width(Length::FillPortion(3));

        let options = column![
            text("Report settings").size(18),
            checkbox("Include high resolution photos", self.report_options.include_high_res)
                .on_toggle(Message::IncludeHighRes),
            checkbox("Include heatmaps", self.report_options.include_heatmaps)
                .on_toggle(Message::IncludeHeatmaps),
            checkbox("Hide compliant rooms", self.report_options.hide_compliant)
                .on_toggle(Message::HideCompliant),
            text_input("recipient@example.com", &self.recipient)
                .on_input(Message::RecipientChanged),
            button("Download PDF")
                .on_press(Message::Export(ExportAction::DownloadPdf))
                .width(Length::Fill),
            button("Send by email")
                .on_press(Message::Export(ExportAction::SendEmail {
                    recipient: self.recipient.clone(),
                }))
                .style(button::secondary)
                .width(Length::Fill),
            button("Generate share link")
                .on_press(Message::Export(ExportAction::ShareLink))
                .style(button::secondary)
                .width(Length::Fill),
        ]
        .spacing(12)
        .width(Length::FillPortion(2));

        row![preview, options].spacing(24).into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Per-room section of the report preview
fn room_details<'a>(subject: &'a Subject, options: &ReportOptions) -> Element<'a, Message> {
    let rooms = report::rooms(subject, options).into_iter().map(|pair| {
        let status = pair.status.map(Classification::label).unwrap_or_default();
        let mut lines = column![text(format!("{} - {}", pair.room, status)).size(16)].spacing(2);

        for anomaly in &pair.anomalies {
            lines = lines.push(text(format!("- {}", anomaly.description)).size(13));
        }
        if let Some(note) = &pair.note {
            lines = lines.push(text(format!("Note: {note}")).size(13));
        }
        lines.into()
    });

    Column::with_children(rooms).spacing(12).into()
}

/// Render an image reference: local files are shown, anything else
/// (e.g. remote URLs) gets a placeholder
fn photo<'a>(reference: &'a str, label: &'a str) -> Element<'a, Message> {
    if Path::new(reference).is_file() {
        image(image::Handle::from_path(reference))
            .width(Length::Fill)
            .height(Length::Fill)
            .content_fit(ContentFit::Cover)
            .into()
    } else {
        container(text(format!("{label}\n{reference}")).size(13))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(container::rounded_box)
            .into()
    }
}

fn nav_style(active: bool) -> fn(&Theme, button::Status) -> button::Style {
    if active {
        button::primary
    } else {
        button::secondary
    }
}

/// RUST_LOG wins over the --log flag, which wins over the settings file
fn init_logging(directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> iced::Result {
    let cli = Cli::parse();

    let (settings, settings_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(err) => (Settings::default(), Some(err)),
    };

    init_logging(cli.log.as_deref().unwrap_or(&settings.log_filter));

    iced::application("Room Compare", RoomCompare::update, RoomCompare::view)
        .theme(RoomCompare::theme)
        .centered()
        .run_with(move || RoomCompare::new(cli, settings, settings_error))
}
