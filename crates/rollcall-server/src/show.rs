//! Offline dump of every stored participant.

use std::io::Write;

use rollcall_store::Database;

/// Print one line per stored participant and return how many were printed.
pub fn run(db: &Database, out: &mut impl Write) -> anyhow::Result<usize> {
    let participants = db.list_all_participants()?;

    for p in &participants {
        writeln!(
            out,
            "Participant: chat={} key={} kind={} name={:?} created_at={}",
            p.chat_id,
            p.key(),
            p.identity.kind(),
            p.name(),
            p.created_at.to_rfc3339(),
        )?;
    }

    Ok(participants.len())
}
