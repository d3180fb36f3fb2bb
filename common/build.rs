fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/fluxor.proto");

    let descriptor_path =
        std::path::PathBuf::from(std::env::var("OUT_DIR")?).join("fluxor_descriptor.bin");

    tonic_prost_build::configure()
        .build_client(true)
        .build_server(true)
        .file_descriptor_set_path(descriptor_path)
        .compile_protos(&["proto/fluxor.proto"], &["proto"])?;

    Ok(())
}
