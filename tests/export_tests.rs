// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the export fallback chain

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use woodglass::errors::{AppError, AppResult, ExportError, ShareError};
use woodglass::export::{
    AppSharePayload, ArtifactKind, ExportArtifact, ExportGateway, ExportOutcome, export_artifact,
};

/// Gateway that records every call and answers from a script
struct MockGateway {
    can_share: bool,
    share: Result<(), ShareError>,
    download_ok: bool,
    app_share_ok: bool,
    calls: RefCell<Vec<&'static str>>,
}

impl MockGateway {
    fn new(share: Option<Result<(), ShareError>>, download_ok: bool, app_share_ok: bool) -> Self {
        Self {
            can_share: share.is_some(),
            share: share.unwrap_or(Err(ShareError::Unavailable)),
            download_ok,
            app_share_ok,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

impl ExportGateway for MockGateway {
    fn can_share(&self, _mime_type: &str) -> bool {
        self.can_share
    }

    fn share(&self, _artifact: &ExportArtifact) -> Result<(), ShareError> {
        self.calls.borrow_mut().push("share");
        self.share.clone()
    }

    fn download(&self, artifact: &ExportArtifact) -> AppResult<PathBuf> {
        self.calls.borrow_mut().push("download");
        if self.download_ok {
            Ok(PathBuf::from("/downloads").join(&artifact.file_name))
        } else {
            Err(AppError::Storage("quota exceeded".to_string()))
        }
    }

    fn open_app_share(&self, payload: &AppSharePayload) -> Result<(), ExportError> {
        self.calls.borrow_mut().push("app_share");
        assert!(payload.intent_url().is_ok());
        if self.app_share_ok {
            Ok(())
        } else {
            Err(ExportError::AppShareFailed("no browser".to_string()))
        }
    }
}

fn photo() -> ExportArtifact {
    ExportArtifact {
        kind: ArtifactKind::Photo,
        bytes: Arc::from(&[0x89u8, b'P', b'N', b'G'][..]),
        mime_type: "image/png",
        file_name: "woodglass_20240102_030405.png".to_string(),
    }
}

#[test]
fn test_share_success() {
    let gateway = MockGateway::new(Some(Ok(())), true, true);
    assert_eq!(
        export_artifact(&gateway, &photo()).unwrap(),
        ExportOutcome::Shared
    );
    assert_eq!(gateway.calls(), vec!["share"]);
}

#[test]
fn test_share_cancelled_is_silent() {
    let gateway = MockGateway::new(Some(Err(ShareError::Cancelled)), true, true);
    assert_eq!(
        export_artifact(&gateway, &photo()).unwrap(),
        ExportOutcome::Cancelled
    );
    // No download after a dismissed share sheet
    assert_eq!(gateway.calls(), vec!["share"]);
}

#[test]
fn test_share_failure_falls_back_to_download() {
    let gateway = MockGateway::new(
        Some(Err(ShareError::Failed("bus error".to_string()))),
        true,
        true,
    );
    assert_eq!(
        export_artifact(&gateway, &photo()).unwrap(),
        ExportOutcome::Downloaded(PathBuf::from("/downloads/woodglass_20240102_030405.png"))
    );
    assert_eq!(gateway.calls(), vec!["share", "download"]);
}

#[test]
fn test_unsupported_mime_skips_share() {
    let gateway = MockGateway::new(None, true, true);
    assert!(matches!(
        export_artifact(&gateway, &photo()).unwrap(),
        ExportOutcome::Downloaded(_)
    ));
    assert_eq!(gateway.calls(), vec!["download"]);
}

#[test]
fn test_download_failure_opens_app_share() {
    let gateway = MockGateway::new(None, false, true);
    assert_eq!(
        export_artifact(&gateway, &photo()).unwrap(),
        ExportOutcome::AppShared
    );
    assert_eq!(gateway.calls(), vec!["download", "app_share"]);
}

#[test]
fn test_everything_failing_reports_download_error() {
    let gateway = MockGateway::new(None, false, false);
    assert!(matches!(
        export_artifact(&gateway, &photo()),
        Err(AppError::Storage(_))
    ));
}

#[test]
fn test_default_payload_links_the_app() {
    let url = AppSharePayload::default().intent_url().unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&(
        "url".to_string(),
        woodglass::constants::share::APP_URL.to_string()
    )));
}
