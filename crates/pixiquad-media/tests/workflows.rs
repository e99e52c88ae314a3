//! Integration test: drive both workflows the way the web views do, with
//! overlapping uploads and out-of-order completions.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::io::Cursor;

use pixiquad_media::{
    Completion, Dimensions, Downloadable, MediaKind, NativeDimensions, RemovalError,
    RemoverPhase, RemoverSession, ResizeStep, ResizedArtifact, ResizerSession, SourceMedia,
    ValidationError, interpret_response, probe,
};

fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

#[test]
fn resize_upload_then_replace_with_video() {
    let mut session = ResizerSession::new();

    // Upload a 64x48 JPEG and extract its native size.
    let upload = SourceMedia::new("gradient.jpg", Some("image/jpeg"), gradient_jpeg(64, 48));
    let probe_job = session.select(upload).expect("images are probed");
    assert_eq!(probe_job.kind(), MediaKind::Image);
    let native = probe::image_dimensions(probe_job.bytes().unwrap());
    assert_eq!(
        session.complete_probe(probe_job.ticket(), native),
        Completion::Applied
    );
    assert_eq!(
        session.native(),
        &NativeDimensions::Known(Dimensions {
            width: 64,
            height: 48
        })
    );

    // Whitespace around the numbers is accepted.
    let ResizeStep::Render(job) = session.request_resize(" 100 ", "25").unwrap() else {
        panic!("image resizes produce a job");
    };
    let rendered = job.run();
    assert_eq!(
        session.complete_resize(job.ticket(), rendered).unwrap(),
        Completion::Applied
    );

    let Some(ResizedArtifact::Image(image)) = session.artifact() else {
        panic!("expected image artifact");
    };
    assert_eq!(image.file_name(), "resized-image.png");
    assert_eq!(image.mime_type(), "image/png");
    let decoded = image::load_from_memory(image.bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (100, 25));

    // A second resize is started, then the user uploads a video before it
    // finishes.
    let ResizeStep::Render(late) = session.request_resize("10", "10").unwrap() else {
        panic!("image resizes produce a job");
    };
    // Videos are never read into memory.
    let video = SourceMedia::unloaded("clip.mp4", None);
    let video_probe = session.select(video).expect("videos are probed");
    assert_eq!(video_probe.bytes(), None);
    assert!(session.artifact().is_none());
    assert_eq!(session.native(), &NativeDimensions::Pending);

    let late_result = late.run();
    assert_eq!(
        session.complete_resize(late.ticket(), late_result).unwrap(),
        Completion::Stale
    );
    assert!(session.artifact().is_none());

    // The browser reports the video's size.
    let reported = probe::video_dimensions(1920, 1080);
    assert_eq!(
        session.complete_probe(video_probe.ticket(), reported),
        Completion::Applied
    );

    assert!(matches!(
        session.request_resize("640", "360").unwrap(),
        ResizeStep::Published
    ));
    let Some(ResizedArtifact::Video(video)) = session.artifact() else {
        panic!("expected video artifact");
    };
    assert_eq!(video.mime(), "video/mp4");
    assert_eq!(video.file_name(), "resized-video.mp4");
    assert_eq!(
        video.display(),
        Dimensions {
            width: 640,
            height: 360
        }
    );
}

#[test]
fn validation_errors_carry_user_messages() {
    let mut session = ResizerSession::new();
    assert_eq!(
        session.request_resize("10", "10").unwrap_err().to_string(),
        "Please upload a file first."
    );

    session.select(SourceMedia::new("a.png", Some("image/png"), gradient_jpeg(4, 4)));
    let err = session.request_resize("wide", "10").unwrap_err();
    assert!(matches!(err, ValidationError::InvalidDimension { .. }));
    assert!(err.to_string().starts_with("Please enter valid dimensions"));
    assert!(session.artifact().is_none());

    let err = session.request_resize("16384", "16384").unwrap_err();
    assert!(matches!(err, ValidationError::AreaTooLarge { .. }));
    assert!(err.to_string().starts_with("Please enter valid dimensions"));
    assert!(!session.is_resizing());
}

#[test]
fn remove_background_success_then_failure() {
    let mut session = RemoverSession::new();
    assert_eq!(session.request_removal().unwrap_err(), ValidationError::NoFile);

    session.select(SourceMedia::new(
        "portrait.jpg",
        Some("image/jpeg"),
        gradient_jpeg(16, 16),
    ));
    assert_eq!(session.phase(), RemoverPhase::Ready);

    let job = session.request_removal().unwrap();
    assert_eq!(job.file_name(), "portrait.jpg");
    assert_eq!(session.phase(), RemoverPhase::Pending);

    let body = b"\x89PNG\r\n\x1a\nopaque-bytes".to_vec();
    let response = interpret_response(200, Some("image/png"), body.clone());
    assert_eq!(
        session.complete_removal(job.ticket(), response).unwrap(),
        Completion::Applied
    );
    assert_eq!(session.phase(), RemoverPhase::Done);
    let processed = session.processed().unwrap();
    assert_eq!(processed.bytes(), body.as_slice());
    assert_eq!(processed.file_name(), "background-removed.png");

    let retry = session.request_removal().unwrap();
    let response = interpret_response(403, Some("text/plain"), b"Forbidden".to_vec());
    let err = session.complete_removal(retry.ticket(), response).unwrap_err();
    assert_eq!(
        err,
        RemovalError::Service {
            status: 403,
            message: "Forbidden".into()
        }
    );
    assert_eq!(err.to_string(), "API Error: Forbidden");
    assert_eq!(session.phase(), RemoverPhase::Ready);
    assert_eq!(session.last_error(), Some(&err));
}

#[test]
fn remove_background_upload_during_request() {
    let mut session = RemoverSession::new();
    session.select(SourceMedia::new("one.png", Some("image/png"), vec![1]));
    let first = session.request_removal().unwrap();

    session.select(SourceMedia::new("two.png", Some("image/png"), vec![2]));
    let second = session.request_removal().unwrap();
    assert_eq!(second.bytes(), &[2]);

    // The superseded request resolves last and must not overwrite.
    let fresh = interpret_response(200, Some("image/png"), vec![20]);
    assert_eq!(
        session.complete_removal(second.ticket(), fresh).unwrap(),
        Completion::Applied
    );
    let stale = interpret_response(200, Some("image/png"), vec![10]);
    assert_eq!(
        session.complete_removal(first.ticket(), stale).unwrap(),
        Completion::Stale
    );
    assert_eq!(session.processed().unwrap().bytes(), &[20]);
}
