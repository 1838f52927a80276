//! # Surface 模块
//!
//! 输出表面：把宿主帧写到某个输出流。
//!
//! - [`JsonLinesSurface`]：每帧一行 JSON，便于管道处理和回放比对
//! - [`TextSurface`]：人类可读的摘要

use std::io::Write;

use motion_runtime::TransitionOutcome;

use crate::animator::AnimationPass;
use crate::app::HostFrame;
use crate::error::HostResult;

/// 输出表面接口
pub trait RenderSurface {
    /// 输出一帧
    fn present(&mut self, frame: &HostFrame) -> HostResult<()>;

    /// 会话结束时刷新输出
    fn flush(&mut self) -> HostResult<()> {
        Ok(())
    }
}

/// JSON Lines 输出
pub struct JsonLinesSurface<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// 取回底层输出流
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSurface for JsonLinesSurface<W> {
    fn present(&mut self, frame: &HostFrame) -> HostResult<()> {
        serde_json::to_writer(&mut self.out, frame)?;
        writeln!(self.out)?;
        Ok(())
    }

    fn flush(&mut self) -> HostResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// 文本输出
pub struct TextSurface<W: Write> {
    out: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSurface for TextSurface<W> {
    fn present(&mut self, frame: &HostFrame) -> HostResult<()> {
        write!(self.out, "step {}", frame.step)?;
        if let Some(trigger) = &frame.trigger {
            write!(self.out, " [{}]", trigger)?;
        }
        if let Some(outcome) = &frame.outcome {
            write!(self.out, " {}", describe_outcome(outcome))?;
        }
        writeln!(
            self.out,
            " | token {} | {}",
            frame.frame.token,
            describe_animation(&frame.animation)
        )?;

        if !frame.unmounted.is_empty() {
            writeln!(self.out, "  unmounted: {}", frame.unmounted.join(", "))?;
        }

        let mut screens: Vec<_> = frame.frame.screens.iter().collect();
        screens.sort_by_key(|screen| screen.z_order);
        for screen in screens {
            writeln!(
                self.out,
                "  {:<8} z={:<3} {:<7} hit={:<3} {}{}",
                screen.screen_id,
                screen.z_order,
                if screen.visible { "visible" } else { "hidden" },
                if screen.hit_test_enabled { "on" } else { "off" },
                if screen.context.presence.is_suppressed() {
                    "suppressed"
                } else {
                    "inherit"
                },
                if screen.context.is_current { " current" } else { "" },
            )?;
        }
        Ok(())
    }

    fn flush(&mut self) -> HostResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

fn describe_outcome(outcome: &TransitionOutcome) -> String {
    match outcome {
        TransitionOutcome::Added { screen_id } => format!("added {}", screen_id),
        TransitionOutcome::Advanced { screen_id } => format!("advanced to {}", screen_id),
        TransitionOutcome::Returned {
            screen_id,
            departing,
            superseded,
        } => match superseded {
            Some(purged) => format!(
                "returned to {} (departing {}, purged {})",
                screen_id, departing, purged
            ),
            None => format!("returned to {} (departing {})", screen_id, departing),
        },
        TransitionOutcome::Purged { screen_id } => format!("purged {}", screen_id),
        TransitionOutcome::AnchorUpdated {
            screen_id,
            eligible,
        } => format!("anchor {}={}", screen_id, eligible),
        TransitionOutcome::Rejected { reason } => format!("rejected: {}", reason),
    }
}

fn describe_animation(pass: &AnimationPass) -> String {
    match pass {
        AnimationPass::Instant => "instant".to_string(),
        AnimationPass::SharedLayout {
            matched, exiting, ..
        } => format!(
            "shared-layout matched=[{}] exiting={}",
            matched.join(", "),
            exiting.len()
        ),
    }
}
