use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

/// Atmosphere streams file that passes every check
pub const VALID_ATMOSPHERE: &str = r#"<?xml version="1.0"?>
<streams>
  <immutable_stream name="input"
                    type="input"
                    filename_template="x1.40962.init.nc"
                    input_interval="initial_only"/>

  <immutable_stream name="restart"
                    type="input;output"
                    filename_template="restart.$Y-$M-$D_$h.$m.$s.nc"
                    input_interval="initial_only"
                    output_interval="1_00:00:00"/>

  <stream name="output"
          type="output"
          filename_template="history.$Y-$M-$D_$h.$m.$s.nc"
          output_interval="6:00:00">
    <file name="stream_list.atmosphere.output"/>
  </stream>

  <stream name="diagnostics"
          type="output"
          filename_template="diag.$Y-$M-$D_$h.$m.$s.nc"
          output_interval="stream:output:output_interval">
    <var name="relhum"/>
  </stream>

  <stream name="surface"
          type="input"
          filename_template="x1.40962.sfc_update.nc"
          input_interval="86400">
    <var name="sst"/>
  </stream>

  <stream name="adaptive"
          type="output"
          filename_template="adaptive.$Y-$M-$D.nc">
    <output_interval>
      <range start="0000-01-01_00:00:00" end="0000-01-05_00:00:00" interval="1:00:00"/>
      <range start="0000-01-05_00:00:00" interval="1_00:00:00"/>
    </output_interval>
  </stream>
</streams>
"#;

/// Ocean streams file with one problem per stream
pub const INVALID_OCEAN: &str = r#"<streams>
  <stream name="mesh" type="input" filename_template="mesh.nc"/>
  <stream name="output" type="sideways" filename_template="out.nc"/>
  <stream name="averages" type="output" filename_template="avg.$Y.$X.nc" output_interval="stream:missing:output_interval"/>
  <immutable_stream name="restart" type="input" filename_template="restart.nc" input_interval="initial_only">
    <var name="temperature"/>
  </immutable_stream>
</streams>
"#;

/// Land-ice streams file that is not well formed
pub const MALFORMED_LANDICE: &str = "<streams>\n  <stream name=\"output\" type=\"output\">\n  </stream\n</streams>\n";

/// Create a temporary run directory holding several streams files
pub async fn create_temp_streams_tree() -> std::io::Result<TempDir> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    fs::create_dir_all(root.join("atmosphere")).await?;
    fs::create_dir_all(root.join("ocean")).await?;
    fs::create_dir_all(root.join("landice")).await?;

    fs::write(root.join("atmosphere/streams.atmosphere"), VALID_ATMOSPHERE).await?;
    fs::write(root.join("atmosphere/stream_list.atmosphere.output"), "theta\nrho\n").await?;
    fs::write(root.join("atmosphere/namelist.atmosphere"), "&nhyd_model\n/\n").await?;
    fs::write(root.join("ocean/streams.ocean"), INVALID_OCEAN).await?;
    fs::write(root.join("landice/streams.landice"), MALFORMED_LANDICE).await?;

    Ok(temp_dir)
}

/// Write `content` to `name` inside `dir`
pub async fn write_file(dir: &Path, name: &str, content: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content).await?;
    Ok(path)
}
