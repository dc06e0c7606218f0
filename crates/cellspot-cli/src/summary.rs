use std::path::Path;

use cellspot_core::detection::{CoordinateSpace, Detections};
use cellspot_core::frame::SourceInfo;
use cellspot_core::pipeline::PipelineConfig;
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            error: Style::new().red().bold(),
        }
    }
}

pub fn print_run_summary(
    info: &SourceInfo,
    output: &Path,
    config: &PipelineConfig,
    frames: (usize, usize),
) {
    let s = Styles::new();
    let bg = &config.background;
    let det = &config.detection;

    println!();
    println!("  {}", s.title.apply_to("Cellspot"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(8)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(info.path.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(format!(
            "{}..{} of {} ({}x{})",
            frames.0, frames.1, info.total_frames, info.width, info.height
        ))
    );
    println!();

    println!("  {}", s.header.apply_to("Background"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(bg.method)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Polarity"),
        s.value.apply_to(bg.polarity)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Block"),
        s.value.apply_to(format!("{} px", bg.block_size))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Constant"),
        s.value.apply_to(bg.subtracted_constant)
    );
    if bg.window_size > 1 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Downsample"),
            s.value.apply_to(format!("{}x", bg.window_size))
        );
    }
    println!();

    if config.tuning_mode {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Detection"),
            s.disabled.apply_to("tuning mode, masks only")
        );
        println!();
        return;
    }

    println!("  {}", s.header.apply_to("Detection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Min dist"),
        s.value.apply_to(format!("{} px", det.min_local_max_dist))
    );
    if det.min_box_weight > 0.0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Box weight"),
            s.value.apply_to(det.min_box_weight)
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Box weight"),
            s.disabled.apply_to("disabled")
        );
    }
    let coordinates = match det.coordinate_space {
        CoordinateSpace::Source => "source pixels",
        CoordinateSpace::Mask => "mask pixels",
    };
    println!(
        "    {:<12}{}",
        s.label.apply_to("Coordinates"),
        s.method.apply_to(coordinates)
    );
    println!();
}

/// Per-frame box counts, then failures. `start` maps batch positions back
/// to absolute frame numbers.
pub fn print_detections(detections: &Detections, start: usize) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Results"));
    for (ordinal, outcome) in detections.iter() {
        let key = Detections::frame_key(start + ordinal);
        match outcome {
            Ok(result) => println!(
                "    {:<14}{}",
                s.label.apply_to(key),
                s.value.apply_to(format!("{} cells", result.len()))
            ),
            Err(e) => println!(
                "    {:<14}{}",
                s.label.apply_to(key),
                s.error.apply_to(format!("failed: {e}"))
            ),
        }
    }

    let total: usize = detections.successes().map(|(_, r)| r.len()).sum();
    let failed = detections.failures().count();
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Total"),
        s.value.apply_to(format!("{total} cells in {} frames", detections.len()))
    );
    if failed > 0 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Failed"),
            s.error.apply_to(format!("{failed} frames"))
        );
    }
}
