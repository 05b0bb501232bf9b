use std::env;

use accent::Palette;
use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let source = env::args().nth(1).context("no source image given")?;
    let image = image::open(&source)
        .with_context(|| format!("could not load image {source:?}"))?
        .to_rgba8();

    let palette = Palette::generate(&image);
    println!("{palette}");

    let hex = |c: image::Rgb<u8>| format!("#{:02X}{:02X}{:02X}", c[0], c[1], c[2]);
    println!("brightness: {:?}", palette.brightness());
    println!("dominant:   {}", hex(palette.dominant));
    println!("contrast:   {}", hex(palette.dominant_contrast));
    println!("highlight:  {}", hex(palette.highlight));
    println!("average:    {}", hex(palette.average));
    println!("foreground: {}", hex(palette.foreground()));
    println!("background: {}", hex(palette.background()));
    Ok(())
}
