//! Scan page: leaf upload or capture, analysis, voice guidance, certificate

use agro_common::db::Account;
use agro_common::{DiagnosisResult, Language};
use axum::{
    extract::{multipart::MultipartError, Extension, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, warn};

use super::layout::{escape_html, notice_box, render_notice, render_page, NavItem};
use super::redirect_to;
use crate::api::SessionId;
use crate::error::{ApiError, ApiResult};
use crate::services::analyzer::has_supported_extension;
use crate::services::certificate::DOWNLOAD_FILE_NAME;
use crate::services::{ImageSource, LeafImage, VoiceClip};
use crate::session::{Notice, Page};
use crate::AppState;

/// Everything shown after "Analyze Crop"
struct ScanOutcome {
    image: LeafImage,
    language: Language,
    diagnosis: DiagnosisResult,
    voice: Result<VoiceClip, String>,
    certificate: Result<(), String>,
}

fn language_picker(selected: Language) -> String {
    Language::ALL
        .iter()
        .map(|lang| {
            format!(
                r#"<label style="display:inline; margin-right:18px;"><input type="radio" name="language" value="{label}"{checked}> {label}</label>"#,
                label = lang.label(),
                checked = if *lang == selected { " checked" } else { "" },
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn scan_form(selected: Language) -> String {
    format!(
        r#"
    <form method="post" action="/scan/analyze" enctype="multipart/form-data">
        <div class="upload">
            <label for="image">Upload leaf image</label>
            <input type="file" id="image" name="image" accept=".jpg,.jpeg,.png">
        </div>
        <div class="upload">
            <label for="camera">Or capture using camera</label>
            <input type="file" id="camera" name="camera" accept="image/*" capture="environment">
        </div>
        <p>Choose language for voice assistance</p>
        {picker}
        <div><button type="submit">Analyze Crop</button></div>
    </form>
    <form method="post" action="/logout">
        <button type="submit">Logout</button>
    </form>
"#,
        picker = language_picker(selected),
    )
}

fn outcome_html(outcome: &ScanOutcome) -> String {
    let image_uri = format!(
        "data:{};base64,{}",
        outcome.image.mime_type(),
        STANDARD.encode(&outcome.image.bytes)
    );

    let voice = match &outcome.voice {
        Ok(clip) => format!(
            r#"<audio controls autoplay src="{}"></audio>"#,
            clip.data_uri()
        ),
        Err(reason) => notice_box(
            "error",
            &format!("Voice assistance unavailable: {}", reason),
        ),
    };

    let certificate = match &outcome.certificate {
        Ok(()) => r#"<a href="/certificate" class="button">📜 Download Certificate</a>"#.to_string(),
        Err(reason) => notice_box("error", &format!("Certificate unavailable: {}", reason)),
    };

    format!(
        r#"
    <img class="preview" src="{image_uri}" alt="Leaf image">
    {problem}
    {solution}
    {plan}
    <div data-language="{language}">{voice}</div>
    <div>{certificate}</div>
"#,
        image_uri = image_uri,
        problem = notice_box("success", &format!("Disease: {}", outcome.diagnosis.problem)),
        solution = notice_box("info", &format!("Solution: {}", outcome.diagnosis.solution)),
        plan = notice_box("warning", &format!("Plan: {}", outcome.diagnosis.plan)),
        language = outcome.language.code(),
        voice = voice,
        certificate = certificate,
    )
}

fn render_scan(
    account: &Account,
    notice: Option<&Notice>,
    outcome: Option<&ScanOutcome>,
) -> Response {
    let selected = outcome.map(|o| o.language).unwrap_or(Language::English);
    let body = format!(
        r#"
    <h3>🌿 Upload or Scan Leaf</h3>
    <p>Logged in as <strong>{name}</strong></p>
    {notice}
    {outcome}
    {form}
"#,
        name = escape_html(&account.display_name),
        notice = notice.map(render_notice).unwrap_or_default(),
        outcome = outcome.map(outcome_html).unwrap_or_default(),
        form = scan_form(selected),
    );

    render_page("Scan", NavItem::Scan, &body).into_response()
}

/// Session account when the visitor may be on the scan page
///
/// `Err` carries the redirect to wherever the session landed instead.
async fn scan_account(state: &AppState, session: SessionId) -> ApiResult<Result<Account, Response>> {
    let (page, account) = session
        .with(state, |s| (s.navigate(Page::Scan), s.account.clone()))
        .await?;

    match account {
        Some(account) if page == Page::Scan => Ok(Ok(account)),
        _ => Ok(Err(redirect_to(page))),
    }
}

/// GET /scan
///
/// Visitors without a logged-in account are redirected to the login page.
pub async fn scan_page(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> ApiResult<Response> {
    let account = match scan_account(&state, session).await? {
        Ok(account) => account,
        Err(redirect) => return Ok(redirect),
    };

    Ok(render_scan(&account, None, None))
}

/// Submitted scan form
struct ScanSubmission {
    upload: Option<LeafImage>,
    camera: Option<LeafImage>,
    language: Option<String>,
}

async fn read_submission(mut multipart: Multipart) -> Result<ScanSubmission, MultipartError> {
    let mut submission = ScanSubmission {
        upload: None,
        camera: None,
        language: None,
    };

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" | "camera" => {
                let file_name = field.file_name().map(str::to_owned);
                let bytes = field.bytes().await?;

                // Browsers send an empty, nameless part for an untouched file input
                if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
                    continue;
                }

                if name == "image" {
                    submission.upload = Some(LeafImage::new(ImageSource::Upload, file_name, bytes.to_vec()));
                } else {
                    submission.camera = Some(LeafImage::new(ImageSource::Camera, file_name, bytes.to_vec()));
                }
            }
            "language" => submission.language = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(submission)
}

/// POST /scan/analyze
///
/// Voice and certificate failures are reported on the page; the diagnosis is
/// always shown.
pub async fn analyze(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let account = match scan_account(&state, session).await? {
        Ok(account) => account,
        Err(redirect) => return Ok(redirect),
    };

    let submission = match read_submission(multipart).await {
        Ok(submission) => submission,
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!(limit = state.max_upload_bytes, "Rejected oversized leaf image");
            let notice = Notice::Error(format!(
                "Image is too large, the limit is {} KiB",
                state.max_upload_bytes / 1024
            ));
            return Ok((StatusCode::PAYLOAD_TOO_LARGE, render_scan(&account, Some(&notice), None)).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let language: Language = match submission.language.as_deref() {
        Some(value) => value.parse()?,
        None => Language::English,
    };

    // Upload wins over camera when both are present
    let Some(image) = submission.upload.or(submission.camera) else {
        let notice = Notice::Error("Upload or capture a leaf image first".to_string());
        return Ok((StatusCode::BAD_REQUEST, render_scan(&account, Some(&notice), None)).into_response());
    };

    if image.source == ImageSource::Upload {
        if let Some(file_name) = image.file_name.as_deref().filter(|n| !n.is_empty()) {
            if !has_supported_extension(file_name) {
                let notice = Notice::Error("Only JPG and PNG images are supported".to_string());
                return Ok((StatusCode::BAD_REQUEST, render_scan(&account, Some(&notice), None)).into_response());
            }
        }
    }

    let diagnosis = state.analyzer.analyze(&image);
    info!(
        analyzer = state.analyzer.name(),
        source = ?image.source,
        bytes = image.bytes.len(),
        problem = %diagnosis.problem,
        "Leaf analyzed"
    );

    let voice = state.voice.render(language).await.map_err(|e| {
        warn!(language = %language, "Voice synthesis failed: {}", e);
        e.to_string()
    });

    let certificate = match state.certificates.generate(&account.display_name).await {
        Ok(path) => {
            session
                .with(&state, |s| s.last_certificate = Some(path))
                .await?;
            Ok(())
        }
        Err(e) => {
            warn!("Certificate generation failed: {}", e);
            Err(e.to_string())
        }
    };

    let outcome = ScanOutcome {
        image,
        language,
        diagnosis,
        voice,
        certificate,
    };

    Ok(render_scan(&account, None, Some(&outcome)))
}

/// GET /certificate
///
/// Downloads the certificate from this session's latest analysis.
pub async fn download_certificate(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> ApiResult<Response> {
    if let Err(redirect) = scan_account(&state, session).await? {
        return Ok(redirect);
    }

    let Some(path) = session.with(&state, |s| s.last_certificate.clone()).await? else {
        return Ok(redirect_to(Page::Scan));
    };

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("Certificate {}", path.display())));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
            ),
        ],
        bytes,
    )
        .into_response())
}
