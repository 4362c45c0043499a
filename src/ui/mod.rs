use iced::{
    widget::{button, column, row, text, text_input, toggler, Space},
    Element, Length,
};

use crate::domain::AudioFormat;

/// Main view state
pub struct DownloadView {
    pub youtube_url: String,
    pub mp3: bool,
    pub wav: bool,
    pub output_folder: String,
    pub status_message: String,
    pub is_downloading: bool,
}

impl DownloadView {
    pub fn new(output_folder: String) -> Self {
        Self {
            youtube_url: String::new(),
            mp3: false,
            wav: false,
            output_folder,
            status_message: "Paste a video URL to download".to_string(),
            is_downloading: false,
        }
    }

    /// Formats whose toggle is on, mp3 first.
    pub fn selected_formats(&self) -> Vec<AudioFormat> {
        AudioFormat::ALL
            .into_iter()
            .filter(|format| match format {
                AudioFormat::Mp3 => self.mp3,
                AudioFormat::Wav => self.wav,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    Mp3Toggled(bool),
    WavToggled(bool),
    ChangeOutputFolderPressed,
    DownloadPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.youtube_url = url;
            }
            DownloadMessage::Mp3Toggled(value) => {
                self.mp3 = value;
            }
            DownloadMessage::WavToggled(value) => {
                self.wav = value;
            }
            DownloadMessage::ChangeOutputFolderPressed | DownloadMessage::DownloadPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let download_button = button("Download")
            .on_press_maybe((!self.is_downloading).then_some(DownloadMessage::DownloadPressed))
            .padding([10, 20]);

        column![
            text("Simple YouTube Downloader").size(24),
            Space::new().height(Length::Fixed(10.0)),
            text_input("YouTube video URL", &self.youtube_url)
                .on_input(DownloadMessage::UrlChanged)
                .width(Length::Fixed(300.0))
                .padding(10),
            row![
                toggler(self.mp3)
                    .label("MP3")
                    .on_toggle(DownloadMessage::Mp3Toggled),
                toggler(self.wav)
                    .label("WAV")
                    .on_toggle(DownloadMessage::WavToggled),
            ]
            .spacing(20),
            text(format!("Save folder: {}", self.output_folder)).size(12),
            button("Change output folder")
                .on_press(DownloadMessage::ChangeOutputFolderPressed)
                .padding([10, 20]),
            download_button,
            Space::new().height(Length::Fixed(10.0)),
            text(&self.status_message).size(14),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles_drive_selected_formats() {
        let mut view = DownloadView::new("/tmp/out".to_string());
        assert!(view.selected_formats().is_empty());

        view.update(DownloadMessage::WavToggled(true));
        assert_eq!(view.selected_formats(), vec![AudioFormat::Wav]);

        view.update(DownloadMessage::Mp3Toggled(true));
        assert_eq!(
            view.selected_formats(),
            vec![AudioFormat::Mp3, AudioFormat::Wav]
        );

        view.update(DownloadMessage::WavToggled(false));
        assert_eq!(view.selected_formats(), vec![AudioFormat::Mp3]);
    }

    #[test]
    fn test_url_input() {
        let mut view = DownloadView::new("/tmp/out".to_string());
        view.update(DownloadMessage::UrlChanged("https://valid/video".to_string()));
        assert_eq!(view.youtube_url, "https://valid/video");
        view.update(DownloadMessage::DownloadPressed);
        assert!(!view.is_downloading);
    }
}
