// Copyright 2026 the Reticle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Full frames driven through `Hud` with recording elements.

use std::cell::RefCell;
use std::rc::Rc;

use reticle_core::accessor::Phase;
use reticle_core::cursor::CursorRay;
use reticle_core::diagnostics::FaultLog;
use reticle_core::element::{ElementCx, HookError, HookResult, HudElement};
use reticle_core::error::TreeError;
use reticle_core::frame::Hud;
use reticle_core::node::NodeId;
use reticle_core::transform::{Transform3d, Vec3};

type Log = Rc<RefCell<Vec<(Phase, &'static str)>>>;

struct Widget {
    name: &'static str,
    log: Log,
    fail_draw: bool,
}

impl Widget {
    fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: Rc::clone(log),
            fail_draw: false,
        }
    }

    fn failing(name: &'static str, log: &Log) -> Self {
        Self {
            fail_draw: true,
            ..Self::new(name, log)
        }
    }
}

impl HudElement for Widget {
    fn depth_test(&mut self, _cx: &mut ElementCx<'_>) -> HookResult {
        self.log.borrow_mut().push((Phase::DepthTest, self.name));
        Ok(())
    }

    fn handle_input(&mut self, _cx: &mut ElementCx<'_>) -> HookResult {
        self.log.borrow_mut().push((Phase::Input, self.name));
        Ok(())
    }

    fn layout(&mut self, _cx: &mut ElementCx<'_>) -> HookResult {
        self.log.borrow_mut().push((Phase::Layout, self.name));
        Ok(())
    }

    fn draw(&mut self, _cx: &mut ElementCx<'_>) -> HookResult {
        if self.fail_draw {
            return Err(HookError::from(format!("{} has no texture", self.name)));
        }
        self.log.borrow_mut().push((Phase::Draw, self.name));
        Ok(())
    }
}

fn drawn(log: &Log) -> Vec<&'static str> {
    log.borrow()
        .iter()
        .filter(|(phase, _)| *phase == Phase::Draw)
        .map(|&(_, name)| name)
        .collect()
}

fn add(hud: &mut Hud<FaultLog>, parent: NodeId, element: Widget) -> NodeId {
    let node = hud.tree_mut().create_node_with(element);
    hud.tree_mut().attach(node, parent).unwrap();
    node
}

#[test]
fn faulting_draw_is_reported_once_and_siblings_still_draw() {
    let log = Log::default();
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let panel = add(&mut hud, root, Widget::new("panel", &log));
    let broken = add(&mut hud, panel, Widget::failing("broken", &log));
    add(&mut hud, panel, Widget::new("label", &log));
    add(&mut hud, root, Widget::new("footer", &log));

    let summary = hud.run_frame();

    assert_eq!(drawn(&log), ["panel", "label", "footer"]);
    assert_eq!(summary.faulted(Phase::Draw), 1);
    assert_eq!(hud.sink().len(), 1);
    let fault = &hud.sink().faults()[0];
    assert_eq!(fault.node, broken);
    assert_eq!(fault.phase, Phase::Draw);
    assert_eq!(fault.message, "broken has no texture");

    // Layout and input of the faulty node were unaffected.
    assert!(log.borrow().contains(&(Phase::Layout, "broken")));
    assert!(log.borrow().contains(&(Phase::Input, "broken")));
}

#[test]
fn draw_order_is_back_to_front_by_key() {
    let log = Log::default();
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let x = add(&mut hud, root, Widget::new("x", &log));
    let y = add(&mut hud, root, Widget::new("y", &log));
    let x_child = add(&mut hud, x, Widget::new("x_child", &log));
    hud.tree_mut().set_z_offset(x, 5);
    hud.tree_mut().set_z_offset(y, -3);
    hud.tree_mut().set_z_offset(x_child, -1);

    hud.run_frame();

    assert!(hud.tree().full_z_offset(x) > hud.tree().full_z_offset(y));
    assert_eq!(drawn(&log), ["y", "x_child", "x"]);
}

#[test]
fn focused_sibling_draws_last() {
    let log = Log::default();
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let a = add(&mut hud, root, Widget::new("a", &log));
    add(&mut hud, root, Widget::new("b", &log));
    assert!(hud.tree_mut().set_focus(root, a));

    hud.run_frame();
    assert_eq!(drawn(&log), ["b", "a"]);
}

#[test]
fn pause_suppresses_all_phases() {
    let log = Log::default();
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    add(&mut hud, root, Widget::failing("a", &log));
    hud.set_paused(true);

    hud.run_frame();
    assert!(log.borrow().is_empty());
    assert!(hud.sink().is_empty());
}

#[test]
fn hidden_subtree_skips_input_and_draw() {
    let log = Log::default();
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let panel = add(&mut hud, root, Widget::new("panel", &log));
    add(&mut hud, panel, Widget::new("child", &log));
    hud.tree_mut().set_visible(panel, false);

    hud.run_frame();
    assert!(drawn(&log).is_empty());
    assert!(log.borrow().contains(&(Phase::Layout, "child")));
    assert!(!log.borrow().contains(&(Phase::Input, "child")));
}

#[test]
fn effective_scale_chain() {
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let tree = hud.tree_mut();
    let a = tree.create_node();
    let b = tree.create_node();
    tree.attach(a, root).unwrap();
    tree.attach(b, a).unwrap();
    tree.set_scale(a, 2.0);
    tree.set_scale(b, 0.5);

    hud.run_frame();
    assert_eq!(hud.tree().effective_scale(root), 1.0);
    assert_eq!(hud.tree().effective_scale(b), 1.0);
}

#[test]
fn detach_after_attach_restores_neutral_baseline() {
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let tree = hud.tree_mut();
    let parent = tree.create_node();
    let child = tree.create_node();
    tree.attach(parent, root).unwrap();
    tree.set_scale(parent, 3.0);
    tree.set_z_offset(parent, 9);
    tree.set_visible(parent, false);
    hud.run_frame();

    let tree = hud.tree_mut();
    tree.attach(child, parent).unwrap();
    assert!(!tree.effective_visible(child));
    assert!(tree.detach(child));
    assert!(tree.effective_visible(child));
    assert_eq!(tree.effective_scale(child), 1.0);
    assert_eq!(tree.effective_z_offset(child), 0);
}

#[test]
fn bulk_registration_keeps_children_before_failure() {
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let tree = hud.tree_mut();
    let owner = tree.create_node();
    let (a, b, c) = (tree.create_node(), tree.create_node(), tree.create_node());
    tree.attach(b, owner).unwrap();

    let err = tree.register_children(root, [a, b, c]).unwrap_err();
    assert!(matches!(err, TreeError::AlreadyParented { child, .. } if child == b));
    assert_eq!(tree.children(root).collect::<Vec<_>>(), [a]);
}

type Hits = Rc<RefCell<Vec<(f64, f64, f64)>>>;

struct Panel {
    hits: Hits,
}

impl HudElement for Panel {
    fn depth_test(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        cx.try_capture_cursor();
        Ok(())
    }

    fn layout(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        if let Some(pos) = cx.cursor_pos() {
            self.hits.borrow_mut().push((pos.plane.x, pos.plane.y, pos.depth));
        }
        Ok(())
    }
}

#[test]
fn identity_space_projects_cursor_to_origin() {
    let hits = Hits::default();
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let space = hud.tree_mut().create_space_with(Panel {
        hits: Rc::clone(&hits),
    });
    hud.tree_mut().attach(space, root).unwrap();
    hud.set_cursor_ray(CursorRay::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)));

    hud.run_frame();
    assert_eq!(*hits.borrow(), [(0.0, 0.0, 0.0)]);
}

#[test]
fn closer_space_captures_cursor() {
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let tree = hud.tree_mut();
    let far = tree.create_space_with(Panel { hits: Rc::default() });
    let near = tree.create_space_with(Panel { hits: Rc::default() });
    tree.register_children(root, [far, near]).unwrap();
    tree.set_plane_to_world(far, Transform3d::from_translation(0.0, 0.0, -10.0));
    tree.set_transform_fn(near, || Transform3d::from_translation(0.0, 0.0, -2.0));

    // Cursor positions come from layout, so capture settles on the second
    // frame.
    hud.run_frame();
    hud.run_frame();
    assert_eq!(hud.tree().cursor().captured(), Some(near));
    assert_eq!(hud.tree().cursor().captured_depth(), Some(4.0));
}

struct Spawner {
    spawned: bool,
    log: Log,
}

impl HudElement for Spawner {
    fn handle_input(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        if !self.spawned {
            self.spawned = true;
            let parent = cx.node();
            let tree = cx.tree_mut();
            let child = tree.create_node_with(Widget::new("spawned", &self.log));
            tree.attach(child, parent)?;
        }
        Ok(())
    }
}

#[test]
fn nodes_attached_by_a_hook_join_next_frame() {
    let log = Log::default();
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let spawner = hud.tree_mut().create_node_with(Spawner {
        spawned: false,
        log: Rc::clone(&log),
    });
    hud.tree_mut().attach(spawner, root).unwrap();

    let first = hud.run_frame();
    assert!(log.borrow().is_empty());
    assert_eq!(first.node_count, 2);
    assert!(hud.tree().accessors_stale());

    let second = hud.run_frame();
    assert!(second.rebuilt);
    assert_eq!(second.node_count, 3);
    assert_eq!(
        *log.borrow(),
        [
            (Phase::DepthTest, "spawned"),
            (Phase::Input, "spawned"),
            (Phase::Layout, "spawned"),
            (Phase::Draw, "spawned"),
        ]
    );
    assert!(!hud.tree().accessors_stale());
}

struct Hider {
    target: NodeId,
    log: Log,
}

impl HudElement for Hider {
    fn draw(&mut self, cx: &mut ElementCx<'_>) -> HookResult {
        self.log.borrow_mut().push((Phase::Draw, "hider"));
        cx.tree_mut().set_visible(self.target, false);
        Ok(())
    }
}

#[test]
fn visibility_changed_mid_pass_applies_to_later_nodes() {
    let log = Log::default();
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let tree = hud.tree_mut();
    let victim = tree.create_node_with(Widget::new("victim", &log));
    let hider = tree.create_node_with(Hider {
        target: victim,
        log: Rc::clone(&log),
    });
    tree.register_children(root, [hider, victim]).unwrap();
    tree.set_z_offset(victim, 1);

    hud.run_frame();
    assert_eq!(drawn(&log), ["hider"]);
    assert!(!hud.tree().effective_visible(victim));
    assert!(
        log.borrow()
            .iter()
            .any(|&entry| entry == (Phase::Layout, "victim"))
    );
}

#[cfg(feature = "std")]
#[test]
fn panicking_hook_is_contained() {
    struct Bomb;
    impl HudElement for Bomb {
        fn handle_input(&mut self, _cx: &mut ElementCx<'_>) -> HookResult {
            panic!("input exploded");
        }
    }

    let log = Log::default();
    let mut hud = Hud::with_sink(FaultLog::new());
    let root = hud.root();
    let bomb = hud.tree_mut().create_node_with(Bomb);
    hud.tree_mut().attach(bomb, root).unwrap();
    add(&mut hud, root, Widget::new("after", &log));

    hud.run_frame();
    assert_eq!(hud.sink().count_for(bomb), 1);
    assert_eq!(drawn(&log), ["after"]);
}
