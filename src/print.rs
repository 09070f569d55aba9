//! Diagnostic document dump. Not a compatibility surface — the format
//! may change between versions; nothing should parse it back.

use std::fmt::Write;

use crate::algorithms::Doc;

fn dump<Aux>(items: &[crate::item::Item<Aux>]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        let glyph = match (&item.content, item.is_deleted) {
            (Some(c), false) => (*c as char).to_string(),
            (Some(c), true) => format!("~{}", *c as char),
            (None, _) => "\u{00b7}".to_string(), // content-less sentinel
        };
        let _ = write!(out, "{i}:{}({}@{}) ", glyph, item.id.agent, item.id.seq);
    }
    return out;
}

pub fn print_doc(doc: &Doc) -> String {
    return match doc {
        Doc::YjsActual(d) => dump(&d.content),
        Doc::YjsMod(d) => dump(&d.content),
        Doc::Automerge(d) => dump(&d.content),
        Doc::Sync9(d) => dump(&d.content),
        Doc::DoubleRga1(d) => dump(&d.content),
        Doc::DoubleRga2(d) => dump(&d.content),
        Doc::DoubleRgaEquivalent(d) => dump(&d.content),
    };
}
