// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the receipt capture flow.
//
// Every technical error maps to a short notice (shown as a toast) and a
// suggestion. Nothing here is fatal: the user can always fall back to the
// unedited original photo.

use crate::error::ScanwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth trying again as-is (e.g. a file that was still being written).
    Transient,
    /// The user must change something (pick another photo, fix a setting).
    ActionRequired,
    /// Retrying will not help.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (toast heading).
    pub message: String,
    /// What the user should try (toast body).
    pub suggestion: String,
    /// Whether retrying the same action may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ScanwerkError` into a `HumanError` suitable for a toast.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        ScanwerkError::ImageLoad(detail) => humanize_load_error(detail),

        ScanwerkError::Processing(detail) => HumanError {
            message: "We couldn't process this photo.".into(),
            suggestion: format!("Try a smaller photo, or attach the original without cropping. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::InvalidCorner(index) => HumanError {
            message: "That corner doesn't exist.".into(),
            suggestion: format!("Drag one of the four corner handles instead. (Index: {index})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::InvalidPoint(..) => HumanError {
            message: "That corner position isn't valid.".into(),
            suggestion: "Place the corner handle somewhere on the photo.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Homography(_) => HumanError {
            message: "The corners don't outline an area we can straighten.".into(),
            suggestion: "Spread the corner handles out so they surround the receipt, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::UnsupportedFormat(format) => HumanError {
            message: "That file type can't be saved.".into(),
            suggestion: format!("Save the receipt as PNG or JPEG instead. (Requested: {format})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::Encode(_) => HumanError {
            message: "We couldn't save the cropped receipt.".into(),
            suggestion: "Try again, or choose a different file type.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanwerkError::Config(detail) => HumanError {
            message: "The scanner settings are invalid.".into(),
            suggestion: format!("Fix or remove the settings file and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "We couldn't find that file.".into(),
                suggestion: "Check the file name and location, then try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We're not allowed to open that file.".into(),
                suggestion: "Check the file's permissions, or copy it somewhere you can access.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Reading or writing a file failed.".into(),
                suggestion: format!("Try again in a moment. ({io_err})"),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        ScanwerkError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Make sure the settings file is valid JSON, or delete it to use the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

/// Decoder messages distinguish truncated files from formats we can't read.
fn humanize_load_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("unexpected end") || lower.contains("eof") || lower.contains("truncated") {
        HumanError {
            message: "The photo looks incomplete.".into(),
            suggestion: "The file may still be uploading. Wait a moment and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else if lower.contains("format") || lower.contains("unsupported") {
        HumanError {
            message: "We can't open this kind of image.".into(),
            suggestion: "Take a new photo, or attach a JPEG or PNG file.".into(),
            retriable: false,
            severity: Severity::Permanent,
        }
    } else {
        HumanError {
            message: "We couldn't open the photo.".into(),
            suggestion: format!("Try taking the photo again. (Detail: {detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    }
}
