use std::{env, error::Error, path::PathBuf};

use quire_markup::{RenderOptions, process_markdown_file};

const SAMPLE: &str = r#"# Harbours

## Tides

Water rises twice a day[^1], and the boats rise with it.

> “Time and tide wait for no man.”
> — Geoffrey Chaucer

![The harbour at low water](harbour.png "Low water credit: photos.example")

```rust
fn high_tides(days: u32) -> u32 {
    days * 2
}
```

[^1]: Near enough, anyway.
"#;

fn main() -> Result<(), Box<dyn Error>> {
  let mut args = env::args().skip(1);
  let chapter = args.next().map(PathBuf::from);
  let number = args.next().map(|n| n.parse()).transpose()?.unwrap_or(1);

  let options = RenderOptions {
    chapter: number,
    ..RenderOptions::default()
  };

  let result = match chapter {
    Some(path) => process_markdown_file(&path, &options)?,
    None => quire_markup::process_markdown_string(SAMPLE, &options),
  };

  println!("Title: {:?}", result.title);
  for heading in &result.headings {
    println!(
      "  {} {} (level {}) -> #{}",
      heading.number, heading.text, heading.level, heading.id
    );
  }
  for warning in &result.warnings {
    eprintln!("warning: {warning}");
  }
  println!("\n{}", result.html);

  Ok(())
}
