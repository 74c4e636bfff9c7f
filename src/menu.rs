use crate::store::AssetStore;
use std::io::{self, BufRead, Write};

pub fn size_label(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

pub fn print_gallery<W: Write>(store: &AssetStore, out: &mut W) -> io::Result<()> {
    writeln!(out, "\n=== Image Gallery ===")?;
    if store.records().is_empty() {
        writeln!(out, "No images available.")?;
        return Ok(());
    }
    for record in store.records() {
        let size = store
            .file_size(record)
            .map(size_label)
            .unwrap_or_else(|| "missing".to_string());
        writeln!(
            out,
            "{} | {} | {} | {} | added {}",
            record.title(),
            record.filename(),
            record.description(),
            size,
            record.created_at().format("%Y-%m-%d %H:%M")
        )?;
    }
    Ok(())
}

fn print_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n=== Gallery Menu ===")?;
    writeln!(out, "1. Add Image")?;
    writeln!(out, "2. Delete Image")?;
    writeln!(out, "3. List Images")?;
    writeln!(out, "4. Save Metadata")?;
    writeln!(out, "5. Load Metadata")?;
    writeln!(out, "6. Audit Storage")?;
    writeln!(out, "0. Exit")
}

/// Prints `label` and reads one trimmed line. `None` on end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> io::Result<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Interactive loop over the store. Store failures are printed and the
/// loop continues; only I/O on the terminal itself ends it early.
pub fn run_menu<R: BufRead, W: Write>(store: &mut AssetStore, input: &mut R, out: &mut W) -> io::Result<()> {
    loop {
        print_menu(out)?;
        let Some(choice) = prompt(input, out, "Choose an option: ")? else {
            break;
        };

        match choice.as_str() {
            "1" => {
                let Some(source) = prompt(input, out, "Enter path to image: ")? else { break };
                let Some(title) = prompt(input, out, "Enter image title: ")? else { break };
                let Some(description) = prompt(input, out, "Enter image description: ")? else {
                    break;
                };
                match store.add_asset(&source, &title, &description) {
                    Ok(()) => writeln!(out, "Image added.")?,
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
            }
            "2" => {
                let Some(title) = prompt(input, out, "Enter title of image to delete: ")? else {
                    break;
                };
                match store.delete_asset(&title) {
                    Ok(true) => writeln!(out, "Image deleted.")?,
                    Ok(false) => writeln!(out, "Image not found.")?,
                    Err(e) => writeln!(out, "Error: {}", e)?,
                }
            }
            "3" => print_gallery(store, out)?,
            "4" => match store.persist() {
                Ok(()) => writeln!(out, "Metadata saved.")?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
            "5" => match store.reload() {
                Ok(()) => writeln!(out, "Metadata loaded.")?,
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
            "6" => match store.audit() {
                Ok(report) if report.is_consistent() => writeln!(out, "Storage is consistent.")?,
                Ok(report) => {
                    for name in &report.orphans {
                        writeln!(out, "Orphan file: {}", name)?;
                    }
                    for name in &report.missing {
                        writeln!(out, "Missing file: {}", name)?;
                    }
                }
                Err(e) => writeln!(out, "Error: {}", e)?,
            },
            "0" => {
                writeln!(out, "Exiting Gallery Manager.")?;
                break;
            }
            _ => writeln!(out, "Invalid option. Please try again.")?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> AssetStore {
        AssetStore::open(
            dir.path().join("images"),
            dir.path().join("index.json"),
            Box::new(MemorySink::default()),
        )
        .unwrap()
    }

    #[test]
    fn size_label_uses_kilobytes() {
        assert_eq!(size_label(0), "0.00 KB");
        assert_eq!(size_label(1536), "1.50 KB");
    }

    #[test]
    fn menu_adds_lists_and_deletes() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photo1.png");
        fs::write(&source, vec![0u8; 2048]).unwrap();
        let mut store = open_store(&dir);

        let script = format!(
            "1\n{}\nSunset\nEvening sky\n3\n2\nSunset\n2\nSunset\n9\n0\n",
            source.display()
        );
        let mut input = Cursor::new(script.into_bytes());
        let mut out = Vec::new();

        run_menu(&mut store, &mut input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Image added."));
        assert!(text.contains("Sunset | photo1.png | Evening sky | 2.00 KB | added "));
        assert!(text.contains("Image deleted."));
        assert!(text.contains("Image not found."));
        assert!(text.contains("Invalid option. Please try again."));
        assert!(text.ends_with("Exiting Gallery Manager.\n"));
        assert!(store.records().is_empty());
    }

    #[test]
    fn menu_reports_errors_and_keeps_running() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let mut input = Cursor::new(b"1\n/definitely/not/here.png\nX\n\n3\n".to_vec());
        let mut out = Vec::new();

        run_menu(&mut store, &mut input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error: Image file not found"));
        assert!(text.contains("No images available."));
    }
}
