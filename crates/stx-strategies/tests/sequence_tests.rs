use super::*;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
#[error("boom")]
struct Boom;

#[test]
fn test_lazy_builds_on_first_pull() {
    let built = Rc::new(Cell::new(false));
    let flag = built.clone();
    let mut seq = Seq::lazy(move || {
        flag.set(true);
        Seq::values([1, 2])
    });
    assert!(!built.get());
    assert_eq!(seq.next().map(|r| r.expect("value")), Some(1));
    assert!(built.get());
}

#[test]
fn test_error_fuses_sequence() {
    let mut seq = Seq::new(
        vec![Ok(1), Err(SearchError::fatal(Boom)), Ok(2)].into_iter(),
    );
    assert!(matches!(seq.next(), Some(Ok(1))));
    assert!(matches!(seq.next(), Some(Err(SearchError::Fatal(_)))));
    assert!(seq.next().is_none());
}

#[test]
fn test_chain_stops_at_error() {
    let seq = Seq::<i32>::error(SearchError::Cancelled).chain(Seq::values([1, 2]));
    let items: Vec<_> = seq.collect();
    assert_eq!(items.len(), 1);
    assert!(items[0].as_ref().is_err_and(SearchError::is_cancelled));
}

#[test]
fn test_flat_map_concatenates() {
    let seq = Seq::values([1usize, 2, 3]).flat_map(|n| Seq::values(vec![n; n]));
    assert_eq!(seq.collect_all().expect("values"), vec![1, 2, 2, 3, 3, 3]);
}

#[test]
fn test_filter_and_take() {
    let evens = Seq::values(0..).filter(|n| n % 2 == 0).take(3);
    assert_eq!(evens.collect_all().expect("values"), vec![0, 2, 4]);
}

#[test]
fn test_uncons() {
    let (first, rest) = Seq::values(["a", "b"])
        .uncons()
        .expect("no error")
        .expect("non-empty");
    assert_eq!(first, "a");
    assert_eq!(rest.collect_all().expect("values"), vec!["b"]);
    assert!(Seq::<u8>::empty().uncons().expect("no error").is_none());
}

#[test]
fn test_interruptible_reports_cancellation_once() {
    let stop = Rc::new(Cell::new(false));
    let watch = stop.clone();
    let mut seq = Seq::values(0..).interruptible(move || watch.get());
    assert!(matches!(seq.next(), Some(Ok(0))));
    stop.set(true);
    assert!(matches!(seq.next(), Some(Err(SearchError::Cancelled))));
    assert!(seq.next().is_none());
}

#[test]
fn test_keep_alive_holds_guard() {
    let guard = Rc::new(());
    let seq = Seq::values([1]).keep_alive(guard.clone());
    assert_eq!(Rc::strong_count(&guard), 2);
    drop(seq);
    assert_eq!(Rc::strong_count(&guard), 1);
}

#[test]
fn test_from_iterator() {
    let seq: Seq<char> = "ab".chars().collect();
    assert_eq!(seq.collect_all().expect("values"), vec!['a', 'b']);
}
