use bytemuck::{Pod, Zeroable};

pub const PRESENT_SOURCE: &str = include_str!("present.wgsl");

/// Uniforms of the presentation pass. Layout matches `Uniforms` in
/// `present.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PresentUniforms {
    /// Width of the soft edge of the round mask, as a fraction of the radius.
    pub mask_softness: f32,
    /// 1.0 masks the corners outside the display circle, 0.0 shows them.
    pub mask_enabled: f32,
    pub _padding: [f32; 2],
}

impl Default for PresentUniforms {
    fn default() -> Self {
        Self {
            mask_softness: 0.01,
            mask_enabled: 1.0,
            _padding: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(module)
    }

    #[test]
    fn test_present_shader_is_valid() {
        let module = validate_wgsl(PRESENT_SOURCE).expect("present shader should be valid");
        let entry_points: Vec<&str> = module
            .entry_points
            .iter()
            .map(|ep| ep.name.as_str())
            .collect();
        assert!(entry_points.contains(&"vs_main"));
        assert!(entry_points.contains(&"fs_main"));
    }

    #[test]
    fn test_uniform_size_matches_wgsl() {
        assert_eq!(std::mem::size_of::<PresentUniforms>(), 16);
    }
}
