fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=shaders/simple.vert");
    println!("cargo:rerun-if-changed=shaders/simple.frag");

    #[cfg(feature = "embed-shaders")]
    compile_shaders();
}

#[cfg(feature = "embed-shaders")]
fn compile_shaders() {
    use std::{env, fs, path::PathBuf};

    let out = PathBuf::from(env::var("OUT_DIR").unwrap());
    let src_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap()).join("shaders");

    let comp = shaderc::Compiler::new().unwrap();
    let mut opts = shaderc::CompileOptions::new().unwrap();

    // Vulkan 1.0 is all the render-pass path needs.
    opts.set_target_env(
        shaderc::TargetEnv::Vulkan,
        shaderc::EnvVersion::Vulkan1_0 as u32,
    );
    opts.set_optimization_level(shaderc::OptimizationLevel::Performance);

    for (name, kind) in [
        ("simple.vert", shaderc::ShaderKind::Vertex),
        ("simple.frag", shaderc::ShaderKind::Fragment),
    ] {
        let src = fs::read_to_string(src_dir.join(name)).unwrap();
        let spv = comp
            .compile_into_spirv(&src, kind, name, "main", Some(&opts))
            .unwrap();
        fs::write(out.join(format!("{name}.spv")), spv.as_binary_u8()).unwrap();
    }
}
