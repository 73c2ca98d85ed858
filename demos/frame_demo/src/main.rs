// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated host loop driving a small HUD.
//!
//! Builds a root with a screen-space status bar and a world-anchored panel
//! that slowly rotates, one widget of which fails to draw. Runs a handful of
//! frames, printing trace events through a
//! [`PrettyPrintSink`](reticle_debug::pretty::PrettyPrintSink) while faults go
//! to the `log` facade. Finishes with a tree dump and a JSON snapshot of the
//! update-accessor list.
//!
//! Run with `RUST_LOG=debug` to see accessor rebuilds and fault warnings.

use std::cell::Cell;
use std::f64::consts::PI;
use std::io::{self, Write};
use std::rc::Rc;

use reticle_core::cursor::CursorRay;
use reticle_core::element::{ElementCx, HookError, HookResult, HudElement};
use reticle_core::frame::Hud;
use reticle_core::trace::{
    FaultEvent, FrameSummary, PhaseBeginEvent, PhaseEndEvent, RebuildEvent, TraceSink, Tracer,
};
use reticle_core::transform::{Transform3d, Vec3};

use reticle_debug::pretty::{PrettyPrintSink, dump_tree};
use reticle_debug::recorder::RecorderSink;
use reticle_debug::snapshot;

const FRAME_COUNT: u64 = 4;

/// A widget that logs what it would draw.
struct Label {
    text: &'static str,
}

impl HudElement for Label {
    fn draw(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        let origin = cx.tree().node_origin(cx.node());
        log::info!(
            "draw {:?} at ({:.2}, {:.2}, {:.2}) scale={}",
            self.text,
            origin.x,
            origin.y,
            origin.z,
            cx.scale(),
        );
        Ok(())
    }
}

/// A world-anchored panel that claims the cursor when it is the closest
/// space under it.
struct Panel;

impl HudElement for Panel {
    fn depth_test(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        if cx.try_capture_cursor() {
            log::debug!("panel holds the cursor");
        }
        Ok(())
    }

    fn handle_input(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        if cx.cursor().captured() == Some(cx.node())
            && let Some(pos) = cx.cursor_pos()
        {
            log::info!("cursor on panel at ({:.3}, {:.3})", pos.plane.x, pos.plane.y);
        }
        Ok(())
    }
}

/// A widget whose draw always fails.
struct MissingTexture;

impl HudElement for MissingTexture {
    fn draw(&mut self, _cx: &mut ElementCx<'_>) -> HookResult {
        Err(HookError::from("texture `compass.dds` not loaded"))
    }
}

/// Forwards every event to two sinks.
struct Tee<'a> {
    a: &'a mut dyn TraceSink,
    b: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_rebuild(&mut self, e: &RebuildEvent) {
        self.a.on_rebuild(e);
        self.b.on_rebuild(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.a.on_phase_begin(e);
        self.b.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.a.on_phase_end(e);
        self.b.on_phase_end(e);
    }

    fn on_fault(&mut self, e: &FaultEvent) {
        self.a.on_fault(e);
        self.b.on_fault(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.a.on_frame_summary(s);
        self.b.on_frame_summary(s);
    }
}

fn main() -> io::Result<()> {
    env_logger::init();

    let mut hud = Hud::new();
    let root = hud.root();
    let angle = Rc::new(Cell::new(0.0_f64));

    // -- tree --------------------------------------------------------------
    let tree = hud.tree_mut();
    let status = tree.create_node_with(Label { text: "status" });
    let panel = tree.create_space_with(Panel);
    let title = tree.create_node_with(Label { text: "title" });
    let compass = tree.create_node_with(MissingTexture);
    tree.register_children(root, [status, panel])
        .map_err(io::Error::other)?;
    tree.register_children(panel, [title, compass])
        .map_err(io::Error::other)?;
    tree.set_z_offset(status, 10);
    tree.set_scale(panel, 0.5);

    let panel_angle = Rc::clone(&angle);
    tree.set_transform_fn(panel, move || {
        Transform3d::from_translation(0.0, 0.0, -4.0) * Transform3d::from_rotation_y(panel_angle.get())
    });

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(io::stdout()));
    let mut recorder = RecorderSink::new();

    // -- simulated loop ----------------------------------------------------
    for frame in 0..FRAME_COUNT {
        angle.set(PI / 12.0 * frame as f64);
        hud.set_cursor_ray(CursorRay::new(
            Vec3::ZERO,
            Vec3::new(0.05 * frame as f64, 0.0, -1.0),
        ));

        let mut tee = Tee {
            a: &mut pretty,
            b: &mut recorder,
        };
        hud.run_frame_traced(&mut Tracer::new(&mut tee));
    }

    let faults: u32 = recorder.summaries().map(FrameSummary::total_faults).sum();
    let mut out = io::stdout().lock();
    writeln!(out, "\n{FRAME_COUNT} frames, {faults} faults contained\n")?;
    dump_tree(hud.tree(), root, &mut out)?;
    writeln!(out)?;
    snapshot::write_accessors(hud.accessors(), &mut out)?;
    writeln!(out)?;
    Ok(())
}
