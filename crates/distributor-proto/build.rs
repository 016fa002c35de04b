fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Use the vendored protoc unless the environment provides one
	if std::env::var_os("PROTOC").is_none() {
		std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
	}

	tonic_prost_build::configure().build_server(true).build_client(true).compile_protos(
		&["proto/ukama/distributor/v1/distributor.proto", "proto/ukama/eventnotify/v1/eventnotify.proto"],
		&["proto/"],
	)?;

	Ok(())
}

// vim: ts=4
