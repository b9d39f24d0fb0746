use identity::Endpoint;
use logquery::Service;
use std::collections::BTreeSet;
use std::io::{self, Write};

pub fn print_identity<W: Write>(out: &mut W, endpoint: &Endpoint) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut *out, endpoint)?;
    writeln!(out).map_err(serde_json::Error::io)
}

pub fn print_header<W: Write>(out: &mut W, service: Service) -> io::Result<()> {
    writeln!(out, "=== {service} ===")
}

pub fn print_session_ids<W: Write>(out: &mut W, session_ids: &BTreeSet<String>) -> io::Result<()> {
    if session_ids.is_empty() {
        return writeln!(out, "# no proxy sessions found");
    }
    writeln!(out, "# proxy sessions ({}):", session_ids.len())?;
    for session_id in session_ids {
        writeln!(out, "#   {session_id}")?;
    }
    Ok(())
}

pub fn print_lines<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
