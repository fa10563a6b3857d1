use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use proptest::prelude::*;
use qirust_studio::{
    generate_matrix, Color, ContentFields, ContentType, DesignSpec, EcLevel, Engine, EngineConfig, EngineError,
    GenerateRequest, LogoSource, OutputFormat, RasterConfig,
};

fn engine() -> Engine {
    Engine::new(EngineConfig {
        tracking_origin: "https://example.com".into(),
        raster: RasterConfig { load_system_fonts: false, ..RasterConfig::default() },
        ..EngineConfig::default()
    })
    .unwrap()
}

/// Decodes every symbol found in an encoded raster image.
fn decode(bytes: &[u8]) -> Vec<String> {
    let img = image::load_from_memory(bytes).unwrap().to_luma8();
    let pad = 64;
    let (iw, ih) = (img.width() as usize, img.height() as usize);
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(iw + 2 * pad, ih + 2 * pad, |x, y| {
        if x < pad || y < pad || x >= pad + iw || y >= pad + ih {
            255
        } else {
            img.get_pixel((x - pad) as u32, (y - pad) as u32)[0]
        }
    });
    prepared
        .detect_grids()
        .into_iter()
        .filter_map(|grid| grid.decode().ok().map(|(_, content)| content))
        .collect()
}

fn png_logo_uri() -> String {
    let img = image::RgbaImage::from_pixel(16, 16, image::Rgba([220, 40, 40, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img).write_to(&mut out, image::ImageFormat::Png).unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(out.into_inner()))
}

#[test]
fn vcard_round_trips_through_png() {
    let fields = ContentFields::new()
        .with("firstName", "Jane")
        .with("lastName", "Doe")
        .with("phone", "+15551234567")
        .with("email", "jane@x.com");
    let request = GenerateRequest::new(ContentType::VCard, fields);
    let artifact = engine().generate(&request, OutputFormat::Png).unwrap();
    assert_eq!(artifact.mime_type(), "image/png");

    let decoded = decode(&artifact.bytes);
    assert_eq!(decoded.len(), 1);
    assert!(decoded[0].contains("FN:Jane Doe"));
    assert!(decoded[0].contains("TEL:+15551234567"));
}

#[test]
fn wifi_round_trips_exactly() {
    let fields = ContentFields::new()
        .with("ssid", "CafeNet")
        .with("password", "brew1234")
        .with("encryption", "WPA");
    let request = GenerateRequest::new(ContentType::Wifi, fields);
    let artifact = engine().generate(&request, OutputFormat::Png).unwrap();
    assert_eq!(decode(&artifact.bytes), ["WIFI:T:WPA;S:CafeNet;P:brew1234;;"]);
}

#[test]
fn website_with_tracking_slug_encodes_redirect() {
    let request = GenerateRequest::new(ContentType::Website, ContentFields::new().with("url", "https://rust-lang.org"))
        .with_tracking_slug("abc123");
    let engine = engine();
    assert_eq!(engine.payload(&request), "https://example.com/r/abc123");
    let artifact = engine.generate(&request, OutputFormat::Png).unwrap();
    assert_eq!(decode(&artifact.bytes), ["https://example.com/r/abc123"]);
}

#[test]
fn styled_symbol_still_scans() {
    let design = DesignSpec {
        dots_type: "rounded".into(),
        dots_color: Color::rgb(20, 40, 120),
        gradient: true,
        gradient_color: Some(Color::rgb(60, 0, 90)),
        frame_id: 3,
        ..DesignSpec::default()
    };
    let request = GenerateRequest::new(ContentType::Text, ContentFields::new().with("text", "styled but readable"))
        .with_design(design);
    let artifact = engine().generate(&request, OutputFormat::Png).unwrap();
    assert_eq!((artifact.width, artifact.height), (1024, 1024));
    assert_eq!(decode(&artifact.bytes), ["styled but readable"]);
}

#[test]
fn logo_forces_high_level_and_can_overflow() {
    let logo = Some(LogoSource::from_reference(&png_logo_uri()));
    let long = GenerateRequest::new(ContentType::Text, ContentFields::new().with("text", "a".repeat(1500)))
        .with_design(DesignSpec { error_correction: EcLevel::Q, logo: logo.clone(), ..DesignSpec::default() });
    match engine().generate(&long, OutputFormat::Png) {
        Err(EngineError::EncodingTooLarge { payload_len, level }) => {
            assert_eq!(payload_len, 1500);
            assert_eq!(level, EcLevel::H);
        }
        other => panic!("expected EncodingTooLarge, got {other:?}"),
    }

    // The same payload fits at Q without a logo.
    assert!(generate_matrix(&"a".repeat(1500), EcLevel::Q).is_ok());

    let short = GenerateRequest::new(ContentType::Text, ContentFields::new().with("text", "b".repeat(150)))
        .with_design(DesignSpec { error_correction: EcLevel::L, logo, ..DesignSpec::default() });
    let engine = engine();
    assert_eq!(engine.matrix(&short).unwrap().level(), EcLevel::H);
    let svg = engine.generate(&short, OutputFormat::Svg).unwrap();
    assert!(String::from_utf8(svg.bytes).unwrap().contains("data:image/png;base64,"));
}

#[test]
fn raster_formats_are_1024_square() {
    let request = GenerateRequest::new(ContentType::Website, ContentFields::new().with("url", "https://example.org"))
        .with_design(DesignSpec { frame_id: 6, ..DesignSpec::default() });
    for (format, expected) in [
        (OutputFormat::Png, image::ImageFormat::Png),
        (OutputFormat::Jpeg, image::ImageFormat::Jpeg),
        (OutputFormat::Webp, image::ImageFormat::WebP),
    ] {
        let artifact = engine().generate(&request, format).unwrap();
        assert_eq!(image::guess_format(&artifact.bytes).unwrap(), expected);
        let img = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((img.width(), img.height()), (1024, 1024), "{format}");
    }
}

#[test]
fn transparent_background_survives_png() {
    let request = GenerateRequest::new(ContentType::Website, ContentFields::new())
        .with_design(DesignSpec { transparent_background: true, ..DesignSpec::default() });
    let artifact = engine().generate(&request, OutputFormat::Png).unwrap();
    let img = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(2, 2)[3], 0);
    assert_eq!(img.get_pixel(1020, 1020)[3], 0);
}

#[test]
fn preview_and_export_share_one_document() {
    let request = GenerateRequest::new(ContentType::Website, ContentFields::new().with("url", "https://example.org"))
        .with_design(DesignSpec { dots_type: "shake".into(), shake_seed: 7, frame_id: 0, ..DesignSpec::default() });
    let engine = engine();
    let preview = engine.render_svg(&request).unwrap().to_svg_string();
    let export = engine.generate(&request, OutputFormat::Svg).unwrap();
    assert_eq!(export.bytes, preview.into_bytes());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn short_content_fits_small_versions(text in "\\PC{1,50}") {
        let matrix = generate_matrix(&text, EcLevel::M).unwrap();
        prop_assert!(matrix.version() <= 10);
        prop_assert_eq!(matrix.size(), matrix.version() as usize * 4 + 17);
    }

    #[test]
    fn every_content_type_fits_at_medium(value in "[ -~]{0,50}") {
        let keys = [
            "url", "text", "ssid", "password", "firstName", "lastName", "phone", "email", "subject",
            "body", "message", "title", "start", "end", "location", "address", "amount", "label",
        ];
        let fields: ContentFields = keys.iter().map(|k| (*k, value.as_str())).collect();
        let tags = [
            "website", "vcard", "wifi", "email", "sms", "phone", "text", "whatsapp", "calendar", "bitcoin", "menu",
        ];
        for tag in tags {
            let content_type: ContentType = tag.parse().unwrap();
            let payload = qirust_studio::encode_payload(&content_type, &fields, None, "https://example.com");
            let matrix = generate_matrix(&payload, EcLevel::M);
            prop_assert!(matrix.is_ok(), "{} payload of {} bytes rejected", tag, payload.len());
            prop_assert!(matrix.unwrap().version() <= 20);
        }
    }
}
