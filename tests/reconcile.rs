use refmod_rs::cigar::EditOp;
use refmod_rs::dictionary::{ModificationDictionary, ModificationEntry};
use refmod_rs::error::SequenceKind;
use refmod_rs::reconcile::{Cursors, order_alignments};
use refmod_rs::{
    AlignmentOrder, AlignmentRecord, FastaDb, ReconcileConfig, Reconciliation, RefmodError,
    Sequence, reconcile,
};

// ── helpers ──────────────────────────────────────────────────────────────────

fn dictionary() -> ModificationDictionary {
    let entry = |code: char, base: char, name: &str| ModificationEntry {
        source_column: "X".to_string(),
        code,
        canonical_base: base,
        short_name: name.to_string(),
    };
    ModificationDictionary::from_entries([
        entry('m', 'A', "mA"),
        entry('n', 'C', "m5C"),
        entry('o', 'A', "m1A"),
    ])
}

fn apply(reference: &str, aln: &AlignmentRecord, query: &str) -> Result<Reconciliation, RefmodError> {
    Reconciliation::new(reference).apply(aln, query, &dictionary(), &ReconcileConfig::default())
}

fn reference(bases: &str) -> Sequence {
    Sequence {
        header: "ref".to_string(),
        bases: bases.to_string(),
    }
}

fn queries(records: &[(&str, &str)]) -> FastaDb {
    let mut db = FastaDb::default();
    for (header, bases) in records {
        db.push(Sequence {
            header: header.to_string(),
            bases: bases.to_string(),
        });
    }
    db
}

// ── cursor transitions ────────────────────────────────────────────────────────

#[test]
fn insert_moves_only_read_cursor() {
    let next = Cursors::new(5).advance(EditOp::Insert);
    assert_eq!(next, Cursors { read: 1, write: 5 });
}

#[test]
fn delete_moves_only_write_cursor() {
    let next = Cursors::new(5).advance(EditOp::Delete);
    assert_eq!(next, Cursors { read: 0, write: 6 });
}

#[test]
fn match_moves_both_and_other_moves_neither() {
    let start = Cursors::new(2);
    assert_eq!(start.advance(EditOp::Match), Cursors { read: 1, write: 3 });
    let other = EditOp::Other(refmod_rs::CigarOp::SoftClip);
    assert_eq!(start.advance(other), start);
}

// ── single alignments ─────────────────────────────────────────────────────────

/// All-match alignment of canonical bases leaves the reference untouched.
#[test]
fn all_match_is_identity() {
    let aln = AlignmentRecord::new("read1_X", 1, "8M");
    let out = apply("ACGUACGU", &aln, "ACGUACGU").unwrap();
    assert_eq!(out.reference_string(), "ACGUACGU");
    assert!(out.positions.is_empty());
}

/// A modified query base aligned to `ref_start` is recorded at `ref_start`
/// and its canonical base is written, not the reference base.
#[test]
fn modification_at_anchor_writes_canonical_base() {
    let aln = AlignmentRecord::new("read1_X", 3, "4M");
    let out = apply("GGCGCUAGCU", &aln, "mGCU").unwrap();
    assert_eq!(out.positions.get(&3).map(String::as_str), Some("mA"));
    assert_eq!(out.reference_string(), "GGAGCUAGCU");
    assert_eq!(out.reference[2], 'A');
    assert_eq!(out.stats.modified_bases, 1);
}

/// `5M1I3M`: the inserted query base contributes nothing to the reference.
#[test]
fn insertion_keeps_reference_length() {
    let aln = AlignmentRecord::new("read1_X", 1, "5M1I3M");
    let out = apply("ACGUACGUAC", &aln, "ACGUAGCGU").unwrap();
    assert_eq!(out.reference.len(), 10);
    assert_eq!(out.reference_string(), "ACGUACGUAC");
    assert_eq!(out.stats.inserted_bases, 1);
}

#[test]
fn insertion_does_not_shift_reference_positions() {
    let aln = AlignmentRecord::new("read1_X", 1, "2M1I2M");
    let out = apply("ACGU", &aln, "ACGmU").unwrap();
    assert_eq!(out.positions.get(&3).map(String::as_str), Some("mA"));
    assert_eq!(out.reference_string(), "ACAU");
}

/// The deleted reference base is kept and the query cursor stays put.
#[test]
fn deletion_keeps_reference_base_and_query_cursor() {
    let aln = AlignmentRecord::new("read1_X", 1, "2M1D2M");
    let out = apply("ACGUA", &aln, "ACmA").unwrap();
    assert_eq!(out.reference_string(), "ACGAA");
    assert_eq!(out.positions.get(&4).map(String::as_str), Some("mA"));
    assert_eq!(out.stats.deleted_bases, 1);
}

#[test]
fn unknown_code_fails_with_code_and_column() {
    let aln = AlignmentRecord::new("read1_X", 1, "2M");
    let err = apply("ACGU", &aln, "AZ").unwrap_err();
    assert_eq!(
        err,
        RefmodError::DictionaryLookup { column: "X".to_string(), code: 'Z' }
    );
}

#[test]
fn source_column_is_last_id_segment() {
    let aln = AlignmentRecord::new("sample_7_read_Y", 1, "1M");
    assert_eq!(aln.source_column(), "Y");
    let err = apply("ACGU", &aln, "m").unwrap_err();
    assert!(matches!(err, RefmodError::DictionaryLookup { ref column, .. } if column == "Y"));
}

#[test]
fn unsupported_op_is_fatal_by_default() {
    let aln = AlignmentRecord::new("read1_X", 1, "1S2M");
    let err = apply("ACGU", &aln, "AAC").unwrap_err();
    assert_eq!(
        err,
        RefmodError::UnknownEditOperation { query_id: "read1_X".to_string(), op: 'S' }
    );
}

#[test]
fn unsupported_op_is_skipped_in_legacy_mode() {
    let aln = AlignmentRecord::new("read1_X", 1, "1S2M");
    let out = Reconciliation::new("ACGU")
        .apply(&aln, "mC", &dictionary(), &ReconcileConfig::legacy())
        .unwrap();
    assert_eq!(out.reference_string(), "ACGU");
    assert_eq!(out.positions.get(&1).map(String::as_str), Some("mA"));
    assert_eq!(out.stats.skipped_ops, 1);
}

#[test]
fn running_off_the_reference_is_an_error() {
    let aln = AlignmentRecord::new("read1_X", 2, "3M");
    let err = apply("ACG", &aln, "CGU").unwrap_err();
    assert_eq!(
        err,
        RefmodError::SequenceLengthMismatch {
            query_id: "read1_X".to_string(),
            sequence: SequenceKind::Reference,
            cursor: 3,
            length: 3,
        }
    );
}

#[test]
fn running_off_the_query_is_an_error() {
    let aln = AlignmentRecord::new("read1_X", 1, "3M");
    let err = apply("ACGU", &aln, "AC").unwrap_err();
    assert!(matches!(
        err,
        RefmodError::SequenceLengthMismatch { sequence: SequenceKind::Query, cursor: 2, length: 2, .. }
    ));

    let aln = AlignmentRecord::new("read1_X", 1, "1M1I");
    let err = apply("ACGU", &aln, "A").unwrap_err();
    assert!(matches!(
        err,
        RefmodError::SequenceLengthMismatch { sequence: SequenceKind::Query, .. }
    ));
}

/// A huge run fails on its first out-of-range step.
#[test]
fn oversized_run_is_a_length_error() {
    let aln = AlignmentRecord::new("read1_X", 1, "4000000000M");
    assert_eq!(
        apply("ACGU", &aln, "ACGU").unwrap_err(),
        RefmodError::SequenceLengthMismatch {
            query_id: "read1_X".to_string(),
            sequence: SequenceKind::Query,
            cursor: 4,
            length: 4,
        }
    );

    let aln = AlignmentRecord::new("read1_X", 1, "1M4000000000D");
    assert!(matches!(
        apply("ACGU", &aln, "A").unwrap_err(),
        RefmodError::SequenceLengthMismatch { sequence: SequenceKind::Reference, cursor: 4, length: 4, .. }
    ));
}

#[test]
fn oversized_unsupported_run_is_skipped_once() {
    let aln = AlignmentRecord::new("read1_X", 1, "4000000000S2M");
    let out = Reconciliation::new("ACGU")
        .apply(&aln, "AC", &dictionary(), &ReconcileConfig::legacy())
        .unwrap();
    assert_eq!(out.reference_string(), "ACGU");
    assert_eq!(out.stats.skipped_ops, 4_000_000_000);
}

#[test]
fn invalid_anchors_are_errors() {
    let aln = AlignmentRecord::new("read1_X", 0, "1M");
    assert!(matches!(
        apply("ACGU", &aln, "A").unwrap_err(),
        RefmodError::InvalidAnchor { ref_start: 0, .. }
    ));

    let aln = AlignmentRecord::new("read1_X", 6, "1I");
    assert!(matches!(
        apply("ACGU", &aln, "A").unwrap_err(),
        RefmodError::SequenceLengthMismatch { sequence: SequenceKind::Reference, cursor: 5, length: 4, .. }
    ));

    // Anchored just past the end: only non-reference-consuming steps fit.
    let aln = AlignmentRecord::new("read1_X", 5, "1I");
    assert_eq!(apply("ACGU", &aln, "A").unwrap().reference_string(), "ACGU");
}

#[test]
fn malformed_script_propagates() {
    let aln = AlignmentRecord::new("read1_X", 1, "2Q");
    assert!(matches!(
        apply("ACGU", &aln, "AC").unwrap_err(),
        RefmodError::MalformedEditScript { .. }
    ));
}

// ── whole runs ────────────────────────────────────────────────────────────────

/// Alignments carrying only canonical bases reproduce the reference exactly.
#[test]
fn no_modifications_round_trip() {
    let reference = reference("ACGUACGUACGU");
    let queries = queries(&[("a_X", "ACGGU"), ("b_X", "CGUCG")]);
    let alignments = vec![
        AlignmentRecord::new("a_X", 1, "3M1I1M"),
        AlignmentRecord::new("b_X", 6, "3M1D2M"),
    ];
    let out = reconcile(&reference, &queries, &alignments, &dictionary(), &ReconcileConfig::default())
        .unwrap();
    assert_eq!(out.reference_string(), reference.bases);
    assert!(out.positions.is_empty());
    assert_eq!(out.stats.alignments, 2);
}

#[test]
fn positions_accumulate_across_alignments() {
    let reference = reference("ACGUACGU");
    let queries = queries(&[("a_X", "mC"), ("b_X", "Gn")]);
    let alignments = vec![
        AlignmentRecord::new("a_X", 1, "2M"),
        AlignmentRecord::new("b_X", 7, "2M"),
    ];
    let out = reconcile(&reference, &queries, &alignments, &dictionary(), &ReconcileConfig::default())
        .unwrap();
    let positions: Vec<(u64, &str)> =
        out.positions.iter().map(|(p, n)| (*p, n.as_str())).collect();
    assert_eq!(positions, vec![(1, "mA"), (8, "m5C")]);
    assert_eq!(out.reference_string(), "ACGUACGC");
}

/// With overlapping alignments the last one applied wins; the processing order
/// is table order for `File` and ascending `ref_start` for `RefStart`.
#[test]
fn overlap_resolution_follows_processing_order() {
    let reference = reference("ACGUACGU");
    let queries = queries(&[("a_X", "Go"), ("b_X", "n")]);
    // Table order: b (start 4) before a (start 3).
    let alignments = vec![
        AlignmentRecord::new("b_X", 4, "1M"),
        AlignmentRecord::new("a_X", 3, "2M"),
    ];

    let file_order = ReconcileConfig { order: AlignmentOrder::File, strict_ops: true };
    let out = reconcile(&reference, &queries, &alignments, &dictionary(), &file_order).unwrap();
    assert_eq!(out.positions.get(&4).map(String::as_str), Some("m1A"));
    assert_eq!(out.reference_string(), "ACGAACGU");
    assert_eq!(out.stats.overwritten_positions, 1);

    let sorted = ReconcileConfig::default();
    let out = reconcile(&reference, &queries, &alignments, &dictionary(), &sorted).unwrap();
    assert_eq!(out.positions.get(&4).map(String::as_str), Some("m5C"));
    assert_eq!(out.reference_string(), "ACGCACGU");
    assert_eq!(out.stats.overwritten_positions, 1);
}

#[test]
fn ref_start_order_is_stable_for_ties() {
    let alignments = vec![
        AlignmentRecord::new("c_X", 9, "1M"),
        AlignmentRecord::new("a_X", 2, "1M"),
        AlignmentRecord::new("b_X", 2, "1M"),
    ];
    let ids: Vec<&str> = order_alignments(&alignments, AlignmentOrder::RefStart)
        .into_iter()
        .map(|aln| aln.query_id.as_str())
        .collect();
    assert_eq!(ids, vec!["a_X", "b_X", "c_X"]);

    let ids: Vec<&str> = order_alignments(&alignments, AlignmentOrder::File)
        .into_iter()
        .map(|aln| aln.query_id.as_str())
        .collect();
    assert_eq!(ids, vec!["c_X", "a_X", "b_X"]);
}

#[test]
fn missing_query_sequence_is_an_error() {
    let reference = reference("ACGU");
    let queries = queries(&[("a_X", "AC")]);
    let alignments = vec![AlignmentRecord::new("z_X", 1, "2M")];
    let err = reconcile(&reference, &queries, &alignments, &dictionary(), &ReconcileConfig::default())
        .unwrap_err();
    assert_eq!(err, RefmodError::MissingQuery { query_id: "z_X".to_string() });
}
