use tubely_core::AspectBucket;

/// Named ratios, sorted by name. Equidistant matches resolve to the earlier entry.
const COMMON_RATIOS: [(&str, f64); 8] = [
    ("16:9", 16.0 / 9.0),
    ("1:1", 1.0),
    ("21:9", 21.0 / 9.0),
    ("32:9", 32.0 / 9.0),
    ("3:2", 3.0 / 2.0),
    ("4:3", 4.0 / 3.0),
    ("5:4", 5.0 / 4.0),
    ("9:16", 9.0 / 16.0),
];

/// Name of the table ratio closest to `width / height`, or `None` for a zero height.
pub fn nearest_ratio(width: u32, height: u32) -> Option<&'static str> {
    if height == 0 {
        return None;
    }

    let actual = f64::from(width) / f64::from(height);
    let mut best: Option<(&'static str, f64)> = None;
    for (name, ratio) in COMMON_RATIOS {
        let diff = (ratio - actual).abs();
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((name, diff)),
        }
    }
    best.map(|(name, _)| name)
}

/// Map stream geometry to its storage bucket.
pub fn classify(width: u32, height: u32) -> AspectBucket {
    match nearest_ratio(width, height) {
        Some("16:9") => AspectBucket::Landscape,
        Some("9:16") => AspectBucket::Portrait,
        _ => AspectBucket::Other,
    }
}
