use std::io::{self, Write};

/// Writes `text` as-is. A closed pipe (`creditlens score x.csv | head`) is not an error.
pub fn write_stdout_text(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_tolerant(&mut stdout, &[text.as_bytes()])
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_tolerant(&mut stdout, &[text.as_bytes(), b"\n"])
}

fn write_tolerant(writer: &mut dyn Write, chunks: &[&[u8]]) -> io::Result<()> {
    for chunk in chunks {
        match writer.write_all(chunk) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
            Err(error) => return Err(error),
        }
    }
    match writer.flush() {
        Err(error) if error.kind() != io::ErrorKind::BrokenPipe => Err(error),
        _ => Ok(()),
    }
}
