use tickline_core::index_map::OrderedIndexMap;
use tickline_core::timeline::ClipId;
use tickline_test_harness::builders::single_track;

#[test]
fn test_temporal_order_differs_from_display_order() {
    // Display order: [C0 @300, C1 @0, C2 @200]
    let (timeline, _, clips) = single_track(&[(300, 80), (0, 100), (200, 50)]);
    let map = OrderedIndexMap::build(&timeline.tracks()[0]);

    assert_eq!(map.len(), 3);
    assert_eq!(map.ordered_index_of(clips[1]), Some(0));
    assert_eq!(map.ordered_index_of(clips[2]), Some(1));
    assert_eq!(map.ordered_index_of(clips[0]), Some(2));

    assert_eq!(map.display_index_of(clips[0]), Some(0));
    assert_eq!(map.ordered_index_to_display_index(0), Some(1));
    assert_eq!(map.clip_at_ordered_index(2), Some(clips[0]));
    assert_eq!(map.clip_at_display_index(2), Some(clips[2]));
    assert_eq!(map.clip_at_ordered_index(3), None);

    let ordered: Vec<ClipId> = map.iter_ordered().collect();
    assert_eq!(ordered, vec![clips[1], clips[2], clips[0]]);
}

#[test]
fn test_equal_starts_keep_display_order() {
    let (timeline, _, clips) = single_track(&[(100, 10), (0, 10), (100, 20), (100, 5)]);
    let map = OrderedIndexMap::build(&timeline.tracks()[0]);
    let ordered: Vec<ClipId> = map.iter_ordered().collect();
    assert_eq!(ordered, vec![clips[1], clips[0], clips[2], clips[3]]);
}

#[test]
fn test_ordered_range_is_order_independent() {
    let (timeline, _, clips) = single_track(&[(300, 80), (0, 100), (200, 50), (500, 10)]);
    let map = OrderedIndexMap::build(&timeline.tracks()[0]);

    let forward = map.ordered_range(clips[1], clips[0]).unwrap();
    let backward = map.ordered_range(clips[0], clips[1]).unwrap();
    assert_eq!(forward, vec![clips[1], clips[2], clips[0]]);
    assert_eq!(forward, backward);

    assert_eq!(map.ordered_range(clips[3], clips[3]).unwrap(), vec![clips[3]]);
    assert!(map.ordered_range(clips[0], ClipId::new()).is_none());
}

#[test]
fn test_empty_track() {
    let (timeline, _, _) = single_track(&[]);
    let map = OrderedIndexMap::build(&timeline.tracks()[0]);
    assert!(map.is_empty());
    assert_eq!(map.clip_at_ordered_index(0), None);
}
