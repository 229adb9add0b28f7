//! Shader compositor: pushes transition uniforms to a rendering surface and
//! draws one blended frame per refresh. Holds no transition logic.

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use tracing::{debug, trace};

use crate::transition::ShaderUniforms;

/// A surface able to render the two-texture crossfade.
pub trait RenderSurface {
    /// Replace the uniform values used by subsequent frames.
    fn set_uniforms(&mut self, uniforms: &ShaderUniforms);

    /// Render and present one frame.
    fn draw_frame(&mut self) -> Result<()>;

    /// The drawable area changed size.
    fn resize(&mut self, width: u32, height: u32);
}

/// Scalar uniforms laid out to match the WGSL `Params` struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UniformBlock {
    pub resolution: [f32; 2],
    pub texture_a_size: [f32; 2],
    pub texture_b_size: [f32; 2],
    pub progress: f32,
    pub _pad: f32,
}

impl From<&ShaderUniforms> for UniformBlock {
    fn from(u: &ShaderUniforms) -> Self {
        Self {
            resolution: u.resolution,
            texture_a_size: u.texture_a_size,
            texture_b_size: u.texture_b_size,
            progress: u.progress,
            _pad: 0.0,
        }
    }
}

pub struct Compositor<S> {
    surface: S,
    resolution: [u32; 2],
    last_pushed: Option<ShaderUniforms>,
}

impl<S: RenderSurface> Compositor<S> {
    #[must_use]
    pub fn new(surface: S, width: u32, height: u32) -> Self {
        Self {
            surface,
            resolution: [width.max(1), height.max(1)],
            last_pushed: None,
        }
    }

    #[must_use]
    pub fn resolution(&self) -> [u32; 2] {
        self.resolution
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let next = [width.max(1), height.max(1)];
        if next == self.resolution {
            return;
        }
        debug!(width = next[0], height = next[1], "compositor resized");
        self.resolution = next;
        self.surface.resize(next[0], next[1]);
    }

    /// Stamp the current resolution into `uniforms`, push them if they
    /// changed since the last frame, then draw.
    ///
    /// # Errors
    /// Propagates surface draw failures.
    pub fn present(&mut self, uniforms: &ShaderUniforms) -> Result<()> {
        let uniforms = &ShaderUniforms {
            resolution: [self.resolution[0] as f32, self.resolution[1] as f32],
            ..*uniforms
        };
        if self.last_pushed.as_ref() != Some(uniforms) {
            trace!(
                a = uniforms.texture_a,
                b = uniforms.texture_b,
                progress = uniforms.progress,
                "uniforms updated"
            );
            self.surface.set_uniforms(uniforms);
            self.last_pushed = Some(*uniforms);
        }
        self.surface.draw_frame()
    }
}

/// Surface that renders nothing and reports uniform changes through tracing.
#[derive(Debug, Default)]
pub struct LogSurface {
    uniforms: Option<ShaderUniforms>,
    frames: u64,
}

impl LogSurface {
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn uniforms(&self) -> Option<&ShaderUniforms> {
        self.uniforms.as_ref()
    }
}

impl RenderSurface for LogSurface {
    fn set_uniforms(&mut self, uniforms: &ShaderUniforms) {
        let pair_changed = self
            .uniforms
            .is_none_or(|u| (u.texture_a, u.texture_b) != (uniforms.texture_a, uniforms.texture_b));
        if pair_changed {
            debug!(a = uniforms.texture_a, b = uniforms.texture_b, "texture pair bound");
        }
        self.uniforms = Some(*uniforms);
    }

    fn draw_frame(&mut self) -> Result<()> {
        self.frames += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "log surface resized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSurface {
        pushes: usize,
        draws: usize,
        sizes: Vec<(u32, u32)>,
    }

    impl RenderSurface for CountingSurface {
        fn set_uniforms(&mut self, _uniforms: &ShaderUniforms) {
            self.pushes += 1;
        }

        fn draw_frame(&mut self) -> Result<()> {
            self.draws += 1;
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.sizes.push((width, height));
        }
    }

    fn uniforms(progress: f32) -> ShaderUniforms {
        ShaderUniforms {
            texture_a: 0,
            texture_b: 1,
            progress,
            resolution: [800.0, 600.0],
            texture_a_size: [1.0, 1.0],
            texture_b_size: [1.0, 1.0],
        }
    }

    #[test]
    fn unchanged_uniforms_are_not_pushed_twice() {
        let mut compositor = Compositor::new(CountingSurface::default(), 800, 600);
        compositor.present(&uniforms(0.0)).unwrap();
        compositor.present(&uniforms(0.0)).unwrap();
        compositor.present(&uniforms(0.4)).unwrap();
        assert_eq!(compositor.surface().pushes, 2);
        assert_eq!(compositor.surface().draws, 3);
    }

    #[test]
    fn resize_forwards_only_real_changes() {
        let mut compositor = Compositor::new(CountingSurface::default(), 800, 600);
        compositor.resize(800, 600);
        compositor.resize(0, 0);
        assert_eq!(compositor.surface().sizes, vec![(1, 1)]);
        assert_eq!(compositor.resolution(), [1, 1]);
    }

    #[test]
    fn present_stamps_the_compositor_resolution() {
        let mut compositor = Compositor::new(LogSurface::default(), 800, 600);
        let mut controller_view = uniforms(0.3);
        controller_view.resolution = [1.0, 1.0];
        compositor.present(&controller_view).unwrap();
        assert_eq!(compositor.surface().uniforms().unwrap().resolution, [800.0, 600.0]);

        compositor.resize(1280, 720);
        compositor.present(&controller_view).unwrap();
        let pushed = compositor.surface().uniforms().unwrap();
        assert_eq!(pushed.resolution, [1280.0, 720.0]);
        assert_eq!(pushed.progress, 0.3);
    }

    #[test]
    fn uniform_block_is_std140_sized() {
        assert_eq!(std::mem::size_of::<UniformBlock>(), 32);
        let block = UniformBlock::from(&uniforms(0.25));
        assert_eq!(block.progress, 0.25);
        assert_eq!(block.resolution, [800.0, 600.0]);
    }
}
