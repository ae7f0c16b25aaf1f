use super::*;

#[test]
fn test_intern_and_lookup() {
    let interner = StringInterner::new();

    let hello = interner.intern("hello");
    let world = interner.intern("world");
    let hello2 = interner.intern("hello");

    assert_eq!(hello, hello2);
    assert_ne!(hello, world);

    assert_eq!(interner.lookup(hello), "hello");
    assert_eq!(interner.lookup(world), "world");
}

#[test]
fn test_empty_string() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn test_primitive_names_pre_interned() {
    let interner = StringInterner::new();
    let before = interner.len();
    let u32_name = interner.intern("u32");
    assert_eq!(interner.len(), before);
    assert_eq!(interner.get("u32"), Some(u32_name));
}

#[test]
fn test_get_does_not_intern() {
    let interner = StringInterner::new();
    let before = interner.len();
    assert_eq!(interner.get("never_seen"), None);
    assert_eq!(interner.len(), before);
}

#[test]
fn test_try_lookup_unknown() {
    let interner = StringInterner::new();
    assert_eq!(interner.try_lookup(Name::new(7, Name::MAX_LOCAL)), None);
}

#[test]
fn test_shared_interner() {
    let interner = SharedInterner::new();
    let interner2 = interner.clone();

    let name1 = interner.intern("shared");
    let name2 = interner2.intern("shared");

    assert_eq!(name1, name2);
}

#[test]
fn test_concurrent_interning_agrees() {
    let interner = SharedInterner::new();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let interner = interner.clone();
            std::thread::spawn(move || {
                (0..200)
                    .map(|i| interner.intern(&format!("ident_{i}")))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<Name>> = handles
        .into_iter()
        .map(|h| h.join().unwrap_or_else(|_| panic!("interner thread panicked")))
        .collect();
    for other in &results[1..] {
        assert_eq!(&results[0], other);
    }
}

#[test]
fn test_shard_overflow_is_reported() {
    let interner = StringInterner::new();
    let mut overflow = None;
    for i in 0..70_000u32 {
        match interner.try_intern(&format!("s{i}")) {
            Ok(_) => {}
            Err(err) => {
                overflow = Some(err);
                break;
            }
        }
    }
    assert!(matches!(
        overflow,
        Some(InternError::ShardOverflow { count, .. }) if count == usize::from(Name::MAX_LOCAL) + 1
    ));
}

#[test]
#[should_panic(expected = "was not interned here")]
fn test_lookup_unknown_panics_with_name() {
    let interner = StringInterner::new();
    let _ = interner.lookup(Name::from_raw(u16::MAX));
}

#[test]
fn test_trait_lookup_is_fallible() {
    let interner = StringInterner::new();
    let known = interner.intern("known");
    let lookup: &dyn StringLookup = &interner;
    assert_eq!(lookup.try_lookup(known), Some("known"));
    assert_eq!(lookup.try_lookup(Name::from_raw(u16::MAX)), None);
}
