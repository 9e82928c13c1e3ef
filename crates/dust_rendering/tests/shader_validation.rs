//! Parses and validates the WGSL program with naga, and checks that the
//! shader-side layouts agree with the host records.

use dust_rendering::gpu::shaders::{FRAGMENT_ENTRY, SIMULATE_ENTRY, VERTEX_ENTRY};
use dust_rendering::gpu::{DustShaders, DustUniforms, ParticleRecord};

fn validate(source: &str) -> naga::Module {
    let module = naga::front::wgsl::parse_str(source).unwrap_or_else(|e| panic!("{}", e.emit_to_string(source)));
    let mut validator =
        naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::empty());
    if let Err(e) = validator.validate(&module) {
        panic!("{e:?}");
    }
    module
}

fn struct_span(module: &naga::Module, name: &str) -> u32 {
    module
        .types
        .iter()
        .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
            (Some(n), naga::TypeInner::Struct { span, .. }) if n == name => Some(*span),
            _ => None,
        })
        .unwrap_or_else(|| panic!("struct {name} missing"))
}

fn entry_points(module: &naga::Module) -> Vec<(&str, naga::ShaderStage)> {
    module.entry_points.iter().map(|e| (e.name.as_str(), e.stage)).collect()
}

#[test]
fn test_simulate_module_validates() {
    let module = validate(&DustShaders::simulate_source());
    assert_eq!(entry_points(&module), vec![(SIMULATE_ENTRY, naga::ShaderStage::Compute)]);
    assert_eq!(struct_span(&module, "Particle") as usize, ParticleRecord::SIZE);
    assert_eq!(struct_span(&module, "DustUniforms") as usize, DustUniforms::SIZE);
}

#[test]
fn test_render_module_validates() {
    let module = validate(&DustShaders::render_source());
    let entries = entry_points(&module);
    assert!(entries.contains(&(VERTEX_ENTRY, naga::ShaderStage::Vertex)));
    assert!(entries.contains(&(FRAGMENT_ENTRY, naga::ShaderStage::Fragment)));
    assert_eq!(struct_span(&module, "DustUniforms") as usize, DustUniforms::SIZE);
}

#[test]
fn test_simulate_workgroup_size() {
    let module = validate(&DustShaders::simulate_source());
    let simulate = &module.entry_points[0];
    assert_eq!(simulate.workgroup_size, [dust_rendering::gpu::WORKGROUP_SIZE, 1, 1]);
}
