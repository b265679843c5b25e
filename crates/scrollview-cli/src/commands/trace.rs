use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use scrollview_core::frame::{self, frame_interval, FrameContext, FrameLoop};
use scrollview_core::scroll::timing::lerp;
use scrollview_core::scroll::{
    AnimationTimer, EasingType, EndReachedDetector, TimerConfig, TimerEvent, TimerEventKind,
};
use scrollview_core::surface::{Axis, ScrollSurface, Size, VirtualSurface};
use scrollview_core::{AppConfig, Dimension, UnitConverter};

#[derive(Args, Debug, Clone)]
pub struct TraceArgs {
    /// Target offset: N or Nrpx (reference units) or Npx
    #[arg(long)]
    pub to: String,
    /// Starting offset in pixels
    #[arg(long, default_value_t = 0.0)]
    pub from: f64,
    /// Animation duration in milliseconds [default: scroll.animation_duration_ms]
    #[arg(long)]
    pub duration: Option<u64>,
    /// Easing curve name [default: scroll.easing]
    #[arg(long)]
    pub easing: Option<String>,
    /// Content height in pixels
    #[arg(long, default_value_t = 2000.0)]
    pub content: f64,
    /// Viewport height in pixels
    #[arg(long, default_value_t = 600.0)]
    pub viewport: f64,
    /// Viewport width in pixels, sets the reference unit ratio
    #[arg(long, default_value_t = 375.0)]
    pub width: f64,
    /// Frame rate [default: scroll.animation_fps]
    #[arg(long)]
    pub fps: Option<u32>,
    /// End-reached threshold [default: scroll.end_reached_threshold]
    #[arg(long)]
    pub threshold: Option<String>,
    /// Print one JSON object per line
    #[arg(long)]
    pub json: bool,
}

/// One timer event as observed by the headless surface
#[derive(Debug, Clone, Serialize)]
pub struct TraceRecord {
    pub frame: u64,
    pub event: &'static str,
    pub elapsed_ms: f64,
    pub percent: f64,
    pub progress: f64,
    pub offset: f64,
    pub end_reached: bool,
}

#[derive(Debug)]
pub struct TraceOutcome {
    pub records: Vec<TraceRecord>,
    pub frames: u64,
    pub target: f64,
    pub final_offset: f64,
}

pub async fn run(config: &AppConfig, args: TraceArgs) -> Result<()> {
    let json = args.json;
    let outcome = trace(config, &args).await?;

    if json {
        for record in &outcome.records {
            println!("{}", serde_json::to_string(record)?);
        }
        return Ok(());
    }

    println!("frame event   elapsed  percent progress    offset");
    for r in &outcome.records {
        println!(
            "{:>5} {:<5} {:>7.1}ms {:>8.3} {:>8.3} {:>9.2}{}",
            r.frame,
            r.event,
            r.elapsed_ms,
            r.percent,
            r.progress,
            r.offset,
            if r.end_reached { "  END REACHED" } else { "" }
        );
    }
    println!(
        "\n{} frames, final offset {:.2}px (target {:.2}px)",
        outcome.frames, outcome.final_offset, outcome.target
    );
    Ok(())
}

/// Animate a [`VirtualSurface`] from `args.from` to `args.to` on the interval driver
pub async fn trace(config: &AppConfig, args: &TraceArgs) -> Result<TraceOutcome> {
    let easing = match &args.easing {
        Some(name) => name.parse::<EasingType>()?,
        None => config.scroll.easing,
    };
    let duration_ms = args.duration.unwrap_or(config.scroll.animation_duration_ms) as f64;
    let interval = args
        .fps
        .map(frame_interval)
        .unwrap_or_else(|| config.scroll.animation_tick_duration());
    let threshold = args
        .threshold
        .clone()
        .map(Dimension::from)
        .unwrap_or_else(|| config.scroll.end_reached_threshold.clone());

    let units = UnitConverter::from_viewport(args.width, config.scroll.reference_width);
    let target = units
        .resolve(&Dimension::from(args.to.as_str()))
        .with_context(|| format!("Invalid --to value {:?}", args.to))?;

    let frames = Rc::new(FrameLoop::new());
    let surface = Rc::new(RefCell::new(VirtualSurface::new(
        Size::new(args.width, args.viewport),
        Size::new(args.width, args.content),
    )));
    surface.borrow_mut().set_scroll_top(args.from);
    let origin = surface.borrow().scroll_top();

    let records = Rc::new(RefCell::new(Vec::new()));
    let detector = RefCell::new(EndReachedDetector::new());

    let recorder: Rc<dyn Fn(&TimerEvent)> = {
        let frames = frames.clone();
        let surface = surface.clone();
        let records = records.clone();
        Rc::new(move |event: &TimerEvent| {
            let mut end_reached = false;
            if event.kind == TimerEventKind::Run {
                let mut surface = surface.borrow_mut();
                surface.set_scroll_top(lerp(origin, target, event.progress));
                end_reached = detector
                    .borrow_mut()
                    .evaluate(surface.axis_metrics(Axis::Vertical), &threshold, &units);
            }
            records.borrow_mut().push(TraceRecord {
                frame: frames.frame_count(),
                event: event.kind.name(),
                elapsed_ms: event.elapsed_ms,
                percent: event.percent,
                progress: event.progress,
                offset: surface.borrow().scroll_top(),
                end_reached,
            });
        })
    };

    let on_start = recorder.clone();
    let on_run = recorder.clone();
    let on_stop = recorder.clone();
    let on_end = recorder;
    let timer_config = TimerConfig::new(easing, duration_ms)
        .on_start(move |e| on_start(e))
        .on_run(move |e| on_run(e))
        .on_stop(move |e| on_stop(e))
        .on_end(move |e| on_end(e));

    let timer = AnimationTimer::new(timer_config, FrameContext::system(frames.clone()));
    timer.run();
    let frame_count = frame::drive(&frames, interval).await;

    let final_offset = surface.borrow().scroll_top();
    let records = records.take();
    Ok(TraceOutcome {
        records,
        frames: frame_count,
        target,
        final_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(to: &str) -> TraceArgs {
        TraceArgs {
            to: to.to_string(),
            from: 0.0,
            duration: Some(100),
            easing: Some("linear".to_string()),
            content: 2000.0,
            viewport: 600.0,
            width: 375.0,
            fps: Some(0),
            threshold: Some("10px".to_string()),
            json: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_trace_reaches_target_in_reference_units() {
        let outcome = trace(&AppConfig::default(), &args("600")).await.unwrap();

        // 600 reference units at half the reference width
        assert_eq!(outcome.target, 300.0);
        assert_eq!(outcome.final_offset, 300.0);

        let events: Vec<&str> = outcome.records.iter().map(|r| r.event).collect();
        assert_eq!(events.first(), Some(&"start"));
        assert_eq!(&events[events.len() - 2..], ["stop", "end"]);

        let runs: Vec<&TraceRecord> = outcome.records.iter().filter(|r| r.event == "run").collect();
        assert_eq!(runs.len() as u64, outcome.frames);
        assert!(runs.len() >= 6);
        assert!(runs.windows(2).all(|w| w[0].offset <= w[1].offset));
        assert_eq!(runs.last().map(|r| r.progress), Some(1.0));
        assert!(outcome.records.iter().all(|r| !r.end_reached));
    }

    #[tokio::test(start_paused = true)]
    async fn test_trace_reports_end_reached_once() {
        let outcome = trace(&AppConfig::default(), &args("1400px")).await.unwrap();
        assert_eq!(outcome.final_offset, 1400.0);
        assert_eq!(outcome.records.iter().filter(|r| r.end_reached).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_trace_runs_no_frames() {
        let mut a = args("200px");
        a.duration = Some(0);
        let outcome = trace(&AppConfig::default(), &a).await.unwrap();
        assert_eq!(outcome.frames, 0);
        assert_eq!(outcome.final_offset, 200.0);
        let events: Vec<&str> = outcome.records.iter().map(|r| r.event).collect();
        assert_eq!(events, ["run", "stop", "end"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trace_above_millisecond_frame_rate() {
        let mut a = args("100px");
        a.fps = Some(2000);
        let outcome = trace(&AppConfig::default(), &a).await.unwrap();
        assert_eq!(outcome.final_offset, 100.0);
        assert!((100..=101).contains(&outcome.frames), "{} frames", outcome.frames);
    }

    #[tokio::test]
    async fn test_trace_rejects_bad_input() {
        assert!(trace(&AppConfig::default(), &args("lots")).await.is_err());

        let mut a = args("10");
        a.easing = Some("wobble".to_string());
        assert!(trace(&AppConfig::default(), &a).await.is_err());
    }
}
