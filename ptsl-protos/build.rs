fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::compile_protos("proto/ptsl.proto")?;

    // Ensure we rebuild when the proto changes
    println!("cargo:rerun-if-changed=proto/ptsl.proto");

    Ok(())
}
