// SPDX-License-Identifier: GPL-3.0-only

//! Saving and simulated email delivery of the finished strip
//!
//! The email path is a placeholder boundary for a real mail integration:
//! the address is validated, the transfer is simulated with a fixed delay,
//! and nothing leaves the machine. Status is poll-driven so the
//! single-threaded UI loop stays responsive while "sending".

use crate::collage::Artifact;
use crate::constants::timing::SIMULATED_SEND;
use crate::errors::{BoothResult, DeliveryError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Email delivery status machine
#[derive(Debug, Clone, Default)]
pub enum DeliveryStatus {
    /// No delivery in progress
    #[default]
    Idle,
    /// Simulated transfer running
    Sending {
        started: Instant,
        address: String,
    },
    /// Transfer completed
    Success { address: String },
    /// Producing or sending the strip failed
    Failed(DeliveryError),
}

impl DeliveryStatus {
    pub fn is_sending(&self) -> bool {
        matches!(self, DeliveryStatus::Sending { .. })
    }
}

/// Simulated email presenter
#[derive(Debug, Default)]
pub struct EmailDelivery {
    status: DeliveryStatus,
}

impl EmailDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &DeliveryStatus {
        &self.status
    }

    /// Validate the address and start the simulated send
    ///
    /// Validation errors are returned without touching the status, so the
    /// form shows them inline and the machine stays `Idle`. A submit while
    /// already sending is ignored.
    pub fn submit(&mut self, artifact: Option<&Artifact>, address: &str) -> Result<(), DeliveryError> {
        if self.status.is_sending() {
            debug!("Submit while sending; ignored");
            return Ok(());
        }

        let address = address.trim();
        if address.is_empty() {
            return Err(DeliveryError::EmptyAddress);
        }

        let Some(artifact) = artifact else {
            return Err(DeliveryError::NothingToSend(
                "no strip has been rendered".to_string(),
            ));
        };

        info!(
            address,
            bytes = artifact.encoded.data.len(),
            "Simulating email delivery"
        );
        self.status = DeliveryStatus::Sending {
            started: Instant::now(),
            address: address.to_string(),
        };
        Ok(())
    }

    /// Advance the simulated transfer; call from the UI poll loop
    pub fn poll(&mut self) -> &DeliveryStatus {
        if let DeliveryStatus::Sending { started, address } = &self.status
            && started.elapsed() >= SIMULATED_SEND
        {
            let address = address.clone();
            info!(address = %address, "Email delivery simulated");
            self.status = DeliveryStatus::Success { address };
        }
        &self.status
    }

    /// Record a failed attempt to produce the strip for sending
    pub fn fail(&mut self, error: DeliveryError) {
        self.status = DeliveryStatus::Failed(error);
    }

    /// Return to `Idle` (form closed or session reset)
    pub fn reset(&mut self) {
        self.status = DeliveryStatus::Idle;
    }
}

/// Save the artifact into `output_dir` ("download")
///
/// A missing artifact is a no-op, not an error: the review view simply has
/// nothing to save yet.
pub fn download(artifact: Option<&Artifact>, output_dir: &Path) -> BoothResult<Option<PathBuf>> {
    let Some(artifact) = artifact else {
        debug!("Download requested with no artifact; ignored");
        return Ok(None);
    };

    let path = crate::storage::unique_strip_path(output_dir, artifact.encoded.format.extension());
    std::fs::create_dir_all(output_dir)?;
    std::fs::write(&path, &artifact.encoded.data)?;

    info!(path = %path.display(), "Strip saved");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collage::{CollageFormat, EncodedCollage};
    use image::RgbImage;

    fn artifact() -> Artifact {
        Artifact {
            image: RgbImage::from_pixel(4, 4, image::Rgb([255, 255, 255])),
            encoded: EncodedCollage {
                data: vec![1, 2, 3],
                format: CollageFormat::Png,
                width: 4,
                height: 4,
            },
        }
    }

    #[test]
    fn test_empty_address_is_rejected_inline() {
        let mut delivery = EmailDelivery::new();
        let artifact = artifact();

        assert_eq!(
            delivery.submit(Some(&artifact), "   "),
            Err(DeliveryError::EmptyAddress)
        );
        assert!(matches!(delivery.status(), DeliveryStatus::Idle));
    }

    #[test]
    fn test_missing_artifact_is_rejected() {
        let mut delivery = EmailDelivery::new();
        assert!(matches!(
            delivery.submit(None, "someone@example.com"),
            Err(DeliveryError::NothingToSend(_))
        ));
        assert!(matches!(delivery.status(), DeliveryStatus::Idle));
    }

    #[test]
    fn test_submit_starts_sending_then_succeeds() {
        let mut delivery = EmailDelivery::new();
        let artifact = artifact();

        delivery
            .submit(Some(&artifact), "someone@example.com")
            .unwrap();
        assert!(delivery.status().is_sending());

        // Polling before the simulated delay keeps sending
        assert!(delivery.poll().is_sending());

        // Force the timer past the delay
        if let DeliveryStatus::Sending { started, .. } = &mut delivery.status {
            *started = Instant::now() - SIMULATED_SEND;
        }
        match delivery.poll() {
            DeliveryStatus::Success { address } => {
                assert_eq!(address, "someone@example.com");
            }
            other => panic!("expected Success, got {:?}", other),
        }
    }

    #[test]
    fn test_double_submit_is_ignored_while_sending() {
        let mut delivery = EmailDelivery::new();
        let artifact = artifact();

        delivery.submit(Some(&artifact), "first@example.com").unwrap();
        delivery.submit(Some(&artifact), "second@example.com").unwrap();

        match delivery.status() {
            DeliveryStatus::Sending { address, .. } => assert_eq!(address, "first@example.com"),
            other => panic!("expected Sending, got {:?}", other),
        }
    }

    #[test]
    fn test_download_without_artifact_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let saved = download(None, dir.path()).unwrap();
        assert!(saved.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_download_writes_encoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let saved = download(Some(&artifact()), dir.path()).unwrap().unwrap();
        assert_eq!(std::fs::read(&saved).unwrap(), vec![1, 2, 3]);
        assert_eq!(saved.extension().unwrap(), "png");
    }
}
