//! Plain-text rendering of a query session.

use std::fmt::{self, Write};

use client_core::{LoadState, QuerySession};
use shared::domain::{LocationRecord, ResidentRecord};

pub fn render(session: &QuerySession) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_session(&mut out, session);
    out
}

fn write_session(out: &mut impl Write, session: &QuerySession) -> fmt::Result {
    match session.state() {
        LoadState::Idle => writeln!(out, "No location data to show.")?,
        LoadState::Loading { identifier } => writeln!(out, "Loading location {identifier}...")?,
        LoadState::Failed { kind, message } => {
            writeln!(out, "Query failed ({}): {message}", kind.describe())?
        }
        LoadState::Ready => {}
    }

    if let Some(location) = session.current_location() {
        if !matches!(session.state(), LoadState::Ready) {
            writeln!(out)?;
        }
        write_location(out, location)?;
        write_residents(out, session)?;
    }
    Ok(())
}

fn write_location(out: &mut impl Write, location: &LocationRecord) -> fmt::Result {
    writeln!(out, "{} (#{})", location.name, location.location_id)?;
    writeln!(out, "  Type: {}", location.kind)?;
    writeln!(out, "  Dimension: {}", location.dimension)?;
    writeln!(out, "  Residents: {}", location.resident_count())
}

fn write_residents(out: &mut impl Write, session: &QuerySession) -> fmt::Result {
    let total_pages = session.total_pages();
    writeln!(out)?;
    if total_pages == 0 {
        return writeln!(out, "This location has no residents.");
    }

    writeln!(
        out,
        "Residents (page {} of {total_pages}):",
        session.page_index()
    )?;
    for resident in session.current_page() {
        write_resident(out, resident)?;
    }
    Ok(())
}

fn write_resident(out: &mut impl Write, resident: &ResidentRecord) -> fmt::Result {
    writeln!(
        out,
        "  #{:<4} {} [{}] origin: {}, episodes: {}",
        resident.resident_id.0,
        resident.name,
        resident.status,
        resident.origin_name,
        resident.episode_count
    )?;
    writeln!(out, "        {}", resident.image_url)
}
