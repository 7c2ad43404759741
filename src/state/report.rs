/// Inspection report summary and export actions
///
/// Export actions are stubs: they validate their input and report their
/// progress through the notifier, no document is produced.

use std::time::Duration;

use thiserror::Error;

use super::data::{Classification, Pair, Subject};
use super::notify::{Level, Notifier};

pub const OP_PDF: &str = "pdf-gen";
pub const OP_EMAIL: &str = "email-send";
pub const OP_SHARE: &str = "share-link";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("Please enter a recipient email address")]
    MissingRecipient,

    #[error("\"{0}\" is not a valid email address")]
    InvalidRecipient(String),
}

/// Status counts for one subject
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub compliant: usize,
    pub to_verify: usize,
    pub non_compliant: usize,
    pub unclassified: usize,
    pub anomalies: usize,
}

impl ReportSummary {
    pub fn of(subject: &Subject) -> Self {
        subject.pairs.iter().fold(Self::default(), |mut summary, pair| {
            match pair.status {
                Some(Classification::Compliant) => summary.compliant += 1,
                Some(Classification::ToVerify) => summary.to_verify += 1,
                Some(Classification::NonCompliant) => summary.non_compliant += 1,
                None => summary.unclassified += 1,
            }
            summary.anomalies += pair.anomalies.len();
            summary
        })
    }

    pub fn classified(&self) -> usize {
        self.compliant + self.to_verify + self.non_compliant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub include_high_res: bool,
    pub include_heatmaps: bool,
    pub hide_compliant: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_high_res: true,
            include_heatmaps: false,
            hide_compliant: false,
        }
    }
}

/// Classified rooms listed in the report detail section
pub fn rooms<'a>(subject: &'a Subject, options: &ReportOptions) -> Vec<&'a Pair> {
    subject
        .pairs
        .iter()
        .filter(|pair| match pair.status {
            None => false,
            Some(Classification::Compliant) => !options.hide_compliant,
            Some(_) => true,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportAction {
    DownloadPdf,
    SendEmail { recipient: String },
    ShareLink,
}

/// What the UI should do once an export action has been accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExport {
    pub op: &'static str,
    pub delay: Duration,
    pub message: String,
}

impl ExportAction {
    pub fn op(&self) -> &'static str {
        match self {
            ExportAction::DownloadPdf => OP_PDF,
            ExportAction::SendEmail { .. } => OP_EMAIL,
            ExportAction::ShareLink => OP_SHARE,
        }
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if let ExportAction::SendEmail { recipient } = self {
            let recipient = recipient.trim();
            if recipient.is_empty() {
                return Err(ReportError::MissingRecipient);
            }
            let valid = recipient
                .split_once('@')
                .is_some_and(|(user, domain)| !user.is_empty() && !domain.is_empty());
            if !valid {
                return Err(ReportError::InvalidRecipient(recipient.to_string()));
            }
        }
        Ok(())
    }

    /// Validate and announce the action.
    ///
    /// Immediate actions complete here and return `None`; delayed ones
    /// post a loading message and return the completion to deliver later.
    pub fn start(
        &self,
        pdf_delay: Duration,
        email_delay: Duration,
        notifier: &mut impl Notifier,
    ) -> Option<PendingExport> {
        if let Err(err) = self.validate() {
            notifier.notify(self.op(), Level::Error, err.to_string());
            return None;
        }

        match self {
            ExportAction::DownloadPdf => {
                notifier.notify(OP_PDF, Level::Loading, "Generating PDF report...".into());
                Some(PendingExport {
                    op: OP_PDF,
                    delay: pdf_delay,
                    message: "Report generated successfully!".into(),
                })
            }
            ExportAction::SendEmail { recipient } => {
                notifier.notify(OP_EMAIL, Level::Loading, "Sending...".into());
                Some(PendingExport {
                    op: OP_EMAIL,
                    delay: email_delay,
                    message: format!("Report sent to {}", recipient.trim()),
                })
            }
            ExportAction::ShareLink => {
                notifier.notify(
                    OP_SHARE,
                    Level::Success,
                    "Share link copied to the clipboard!".into(),
                );
                None
            }
        }
    }
}
