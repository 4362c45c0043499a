use crate::application::DownloadJob;
use crate::config::{Appearance, SettingsStore};
use crate::domain::{DownloadRequest, DownloadResult};
use crate::ui::{DownloadMessage, DownloadView};
use iced::{Task, Theme};
use std::path::PathBuf;
use tracing::{error, info, warn};

pub struct DownloadApp {
    view: DownloadView,
    settings: SettingsStore,
    job: DownloadJob,
}

impl DownloadApp {
    pub fn new(settings: SettingsStore, job: DownloadJob) -> Self {
        let view = DownloadView::new(settings.settings().default_output_folder.clone());

        Self {
            view,
            settings,
            job,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Folder picked in the directory dialog, `None` if cancelled
    OutputFolderSelected(Option<PathBuf>),
    WarningClosed,
    /// Final result after downloading and converting
    DownloadCompleted(DownloadResult),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::ChangeOutputFolderPressed => {
                    let current = app.settings.output_folder();
                    return Task::perform(
                        async move {
                            rfd::AsyncFileDialog::new()
                                .set_directory(&current)
                                .pick_folder()
                                .await
                                .map(|handle| handle.path().to_path_buf())
                        },
                        Message::OutputFolderSelected,
                    );
                }
                DownloadMessage::DownloadPressed if !app.view.is_downloading => {
                    return start_download(app);
                }
                _ => {}
            }
        }
        Message::OutputFolderSelected(Some(folder)) => {
            match app.settings.set_output_folder(&folder) {
                Ok(()) => {
                    app.view.output_folder = folder.to_string_lossy().to_string();
                }
                Err(e) => {
                    error!("Failed to save output folder: {}", e);
                    app.view.status_message = format!("Failed to save settings: {}", e);
                }
            }
        }
        Message::OutputFolderSelected(None) | Message::WarningClosed => {}
        Message::DownloadCompleted(result) => {
            app.view.is_downloading = false;
            app.view.status_message = result.summary();
            if result.succeeded() {
                info!("{}", app.view.status_message);
            } else {
                warn!("{}", app.view.status_message);
            }
        }
    }
    Task::none()
}

fn start_download(app: &mut DownloadApp) -> Task<Message> {
    let request = match DownloadRequest::new(
        app.view.youtube_url.clone(),
        app.view.selected_formats(),
        app.settings.output_folder(),
    ) {
        Ok(request) => request,
        Err(e) => {
            warn!("{}", e);
            let description = e.to_string();
            app.view.status_message = description.clone();
            return Task::perform(
                async move {
                    rfd::AsyncMessageDialog::new()
                        .set_level(rfd::MessageLevel::Warning)
                        .set_title("Warning")
                        .set_description(description)
                        .set_buttons(rfd::MessageButtons::Ok)
                        .show()
                        .await
                },
                |_| Message::WarningClosed,
            );
        }
    };

    app.view.is_downloading = true;
    app.view.status_message = format!("Downloading: {}", request.source_url());

    // One job at a time: the button stays disabled until DownloadCompleted
    let job = app.job.clone();
    Task::perform(
        async move { job.run(&request).await },
        Message::DownloadCompleted,
    )
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

/// `None` follows the OS light/dark preference.
pub fn theme(app: &DownloadApp) -> Option<Theme> {
    match app.settings.settings().theme {
        Appearance::Dark => Some(Theme::Dark),
        Appearance::Light => Some(Theme::Light),
        Appearance::System => None,
    }
}
