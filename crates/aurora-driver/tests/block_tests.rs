//! Controller tests against the simulated core
//!
//! Each test keeps a clone of the `SimulatedCore` handed to the block so it
//! can inspect exactly which registers were written, in which order.

use aurora_driver::chip::{CompatNum, CoreConfig, StopPolicy};
use aurora_driver::{
    AuroraBlock, AuroraError, BlockConfig, ChannelSelect, PropertySource, PropertyValue,
    SimulatedCore, TimestampQueueStatus,
};
use aurora_chip::channel::register_address;
use aurora_chip::regs;

fn open() -> (AuroraBlock, SimulatedCore) {
    let core = SimulatedCore::new();
    let block = AuroraBlock::with_defaults(core.clone()).expect("block init");
    core.clear_log();
    (block, core)
}

// ── Construction ─────────────────────────────────────────────────────────────

#[test]
fn test_construction_resets_and_pushes_defaults() {
    let core = SimulatedCore::new();
    let block = AuroraBlock::with_defaults(core.clone()).expect("block init");

    assert_eq!(block.num_cores(), 1);
    assert_eq!(block.num_channels(), 4);
    assert_eq!(block.channels(), &[0, 1, 2, 3]);
    assert_eq!(block.compat(), CompatNum::new(1, 0));
    assert_eq!(core.reset_count(), 1);

    let log = core.write_log();
    assert_eq!(log[0], (regs::CORE_RESET, 0b111));
    for channel in 0..4 {
        assert_eq!(log[1 + channel], (register_address(channel, regs::CHAN_TS_QUEUE_CTRL), 1));
    }
    assert_eq!(core.written(regs::FC_PAUSE), Some(100));
    assert_eq!(core.written(regs::FC_THRESHOLD), Some(0x00C8_00A0));
}

#[test]
fn test_attach_writes_nothing() {
    let core = SimulatedCore::new();
    core.set_hw(regs::FC_PAUSE, 20);
    core.set_hw(regs::FC_THRESHOLD, 0x0030_0040);

    let mut block = AuroraBlock::attach(core.clone(), BlockConfig::default()).expect("attach");
    assert_eq!(block.num_channels(), 4);
    assert_eq!(core.reset_count(), 0);
    assert!(core.write_log().is_empty());

    assert_eq!(block.get_property("fc_pause_count").expect("get"), PropertyValue::U8(20));
    assert_eq!(
        block.get_property("fc_pause_threshold").expect("get"),
        PropertyValue::U16(0x40)
    );
    assert_eq!(
        block.get_property("fc_resume_threshold").expect("get"),
        PropertyValue::U16(0x30)
    );
}

#[test]
fn test_attach_validates_compat() {
    let core = SimulatedCore::with_config(
        CompatNum::new(3, 0),
        CoreConfig {
            num_cores: 1,
            num_channels: 4,
        },
    );
    let err = AuroraBlock::attach(core.clone(), BlockConfig::default()).unwrap_err();
    assert!(matches!(err, AuroraError::CompatMismatch { found_major: 3, .. }));
    assert!(core.write_log().is_empty());
}

#[test]
fn test_init_after_attach() {
    let core = SimulatedCore::new();
    core.set_hw(regs::FC_PAUSE, 20);
    let mut block = AuroraBlock::attach(core.clone(), BlockConfig::default()).expect("attach");

    block
        .init(aurora_driver::FlowControlParams::default())
        .expect("init");
    assert_eq!(core.reset_count(), 1);
    assert_eq!(core.write_log()[0], (regs::CORE_RESET, 0b111));
    let fc = block.get_flow_control().expect("fc");
    assert_eq!((fc.pause_count, fc.pause_threshold, fc.resume_threshold), (100, 160, 200));
    assert_eq!(block.get_property("fc_pause_count").expect("get"), PropertyValue::U8(100));
}

#[test]
fn test_custom_flow_control_defaults() {
    let core = SimulatedCore::new();
    let config = BlockConfig::default().with_flow_control(aurora_driver::FlowControlParams {
        pause_count: 0,
        pause_threshold: 20,
        resume_threshold: 40,
    });
    let mut block = AuroraBlock::new(core.clone(), config).expect("block init");

    let fc = block.get_flow_control().expect("fc read");
    assert_eq!((fc.pause_count, fc.pause_threshold, fc.resume_threshold), (0, 20, 40));
}

#[test]
fn test_newer_compat_major_rejected() {
    let core = SimulatedCore::with_config(
        CompatNum::new(2, 0),
        CoreConfig {
            num_cores: 1,
            num_channels: 4,
        },
    );
    let err = AuroraBlock::with_defaults(core.clone()).unwrap_err();
    assert!(matches!(
        err,
        AuroraError::CompatMismatch {
            expected_major: 1,
            found_major: 2,
            ..
        }
    ));
    assert_eq!(core.reset_count(), 0);
    assert!(core.write_log().is_empty());
}

#[test]
fn test_zero_channels_rejected() {
    let core = SimulatedCore::with_config(
        CompatNum::EXPECTED,
        CoreConfig {
            num_cores: 1,
            num_channels: 0,
        },
    );
    let err = AuroraBlock::with_defaults(core).unwrap_err();
    assert!(matches!(err, AuroraError::InvalidConfig { .. }));
}

#[test]
fn test_reset_variants() {
    let (mut block, core) = open();

    block.reset_tx().expect("tx reset");
    assert_eq!(core.write_log(), vec![(regs::CORE_RESET, 0b010)]);

    core.clear_log();
    block.reset().expect("reset");
    let log = core.write_log();
    assert_eq!(log.len(), 5);
    assert_eq!(log[0], (regs::CORE_RESET, 0b111));
    assert_eq!(log[4], (register_address(3, regs::CHAN_TS_QUEUE_CTRL), 1));
}

// ── Status and counters ──────────────────────────────────────────────────────

#[test]
fn test_status_decoding() {
    let (mut block, core) = open();
    core.set_hw(regs::CORE_STATUS, 0b0101 | 1 << 4 | 1 << 9 | 1 << 12);

    let status = block.get_status().expect("status");
    assert_eq!(status.lane_status, vec![true, false, true, false]);
    assert!(status.link_status);
    assert!(!status.hard_error);
    assert!(status.soft_error);
    assert!(status.mmcm_lock);
    assert!(!status.pll_lock);

    assert!(block.get_link_status().expect("link"));
    assert!(block.get_lane_status(2).expect("lane 2"));
    assert!(!block.get_lane_status(1).expect("lane 1"));
    assert_eq!(
        block.get_lane_status_all().expect("lanes"),
        vec![true, false, true, false]
    );
}

#[test]
fn test_lane_status_rereads_hardware() {
    let (mut block, core) = open();

    core.set_hw(regs::CORE_STATUS, 0b0011);
    assert!(block.get_lane_status(1).expect("lane 1"));
    assert_eq!(
        block.get_lane_status_all().expect("lanes"),
        vec![true, true, false, false]
    );

    core.set_hw(regs::CORE_STATUS, 0b1100);
    assert!(!block.get_lane_status(1).expect("lane 1"));
    assert!(block.get_lane_status(3).expect("lane 3"));
    assert_eq!(
        block.get_lane_status_all().expect("lanes"),
        vec![false, false, true, true]
    );
}

#[test]
fn test_lane_status_invalid_channel() {
    let (mut block, _core) = open();
    let err = block.get_lane_status(4).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_counters() {
    let (mut block, core) = open();
    core.set_hw(regs::RX_PKT_CTR, 42);
    core.set_hw(regs::TX_PKT_CTR, 17);
    core.set_hw(regs::OVERFLOW_CTR, 3);
    core.set_hw(regs::CRC_ERR_CTR, 1);

    let counters = block.get_counters().expect("counters");
    assert_eq!(counters.rx_packets, 42);
    assert_eq!(counters.tx_packets, 17);
    assert_eq!(counters.overflows, 3);
    assert_eq!(counters.crc_errors, 1);
    assert!(core.write_log().is_empty());
}

// ── Flow control ─────────────────────────────────────────────────────────────

#[test]
fn test_flow_control_defaults() {
    let (mut block, _core) = open();
    assert_eq!(block.get_fc_pause_count().expect("pause count"), 100);
    assert_eq!(block.get_fc_pause_threshold().expect("pause threshold"), 160);
    assert_eq!(block.get_fc_resume_threshold().expect("resume threshold"), 200);
}

#[test]
fn test_thresholds_share_register_without_interference() {
    let (mut block, core) = open();

    block.set_fc_pause_threshold(0x11).expect("pause threshold");
    assert_eq!(core.written(regs::FC_THRESHOLD), Some(0x00C8_0011));
    assert_eq!(block.get_fc_resume_threshold().expect("resume"), 200);

    block.set_fc_resume_threshold(0x22).expect("resume threshold");
    assert_eq!(core.written(regs::FC_THRESHOLD), Some(0x0022_0011));
    assert_eq!(block.get_fc_pause_threshold().expect("pause"), 0x11);
}

#[test]
fn test_threshold_truncated_to_field_width() {
    let (mut block, _core) = open();
    block.set_fc_pause_threshold(1000).expect("pause threshold");
    assert_eq!(block.get_fc_pause_threshold().expect("pause"), 1000 & 0xFF);
    assert_eq!(block.get_fc_resume_threshold().expect("resume"), 200);
}

#[test]
fn test_pause_count_range() {
    let (mut block, core) = open();

    for count in 1..10 {
        let err = block.set_fc_pause_count(count).unwrap_err();
        assert!(matches!(err, AuroraError::InvalidPauseCount { value } if value == count));
    }
    assert!(core.write_log().is_empty());

    let fc = block.get_flow_control().expect("fc");
    assert_eq!((fc.pause_count, fc.pause_threshold, fc.resume_threshold), (100, 160, 200));

    for count in [0, 10, 255] {
        block.set_fc_pause_count(count).expect("valid pause count");
        assert_eq!(block.get_fc_pause_count().expect("pause count"), count);
    }
}

// ── Channel datapath ─────────────────────────────────────────────────────────

#[test]
fn test_enable_all_strobes_every_channel() {
    let (mut block, core) = open();
    block.tx_datapath_enable(true, ChannelSelect::All).expect("enable");

    let expected: Vec<_> = (0..4)
        .map(|channel| (register_address(channel, regs::CHAN_TX_CTRL), 0x1))
        .collect();
    assert_eq!(core.write_log(), expected);
}

#[test]
fn test_disable_single_channel() {
    let (mut block, core) = open();
    block.tx_datapath_enable(false, ChannelSelect::Single(2)).expect("disable");
    assert_eq!(core.write_log(), vec![(0xC0, 0x2)]);
}

#[test]
fn test_invalid_channel_touches_nothing() {
    let (mut block, core) = open();

    assert!(block
        .tx_datapath_enable(true, ChannelSelect::Single(4))
        .unwrap_err()
        .is_invalid_argument());
    assert!(block
        .set_channel_stop_policy(StopPolicy::Buffer, ChannelSelect::Single(7))
        .unwrap_err()
        .is_invalid_argument());
    assert!(block
        .tx_datapath_enqueue_timestamp(1, ChannelSelect::Single(4))
        .unwrap_err()
        .is_invalid_argument());
    assert!(block.get_timestamp_queue_fullness(4).is_err());
    assert!(core.write_log().is_empty());
}

#[test]
fn test_enqueue_timestamp_low_word_first() {
    let (mut block, core) = open();
    block
        .tx_datapath_enqueue_timestamp(0x0000_0012_3456_789A, ChannelSelect::Single(1))
        .expect("enqueue");
    assert_eq!(
        core.write_log(),
        vec![
            (register_address(1, regs::CHAN_TS_LOW), 0x3456_789A),
            (register_address(1, regs::CHAN_TS_HIGH), 0x12),
        ]
    );
}

#[test]
fn test_enqueue_timestamp_all_channels() {
    let (mut block, core) = open();
    block
        .tx_datapath_enqueue_timestamp(u64::MAX, ChannelSelect::All)
        .expect("enqueue");
    let log = core.write_log();
    assert_eq!(log.len(), 8);
    assert!(log.iter().all(|&(_, value)| value == u32::MAX));
    assert_eq!(log[6].0, register_address(3, regs::CHAN_TS_LOW));
}

#[test]
fn test_stop_policy_round_trip() {
    let (mut block, _core) = open();

    block
        .set_channel_stop_policy(StopPolicy::Buffer, ChannelSelect::Single(1))
        .expect("set policy");
    assert_eq!(
        block.get_channel_stop_policies().expect("policies"),
        vec![StopPolicy::Drop, StopPolicy::Buffer, StopPolicy::Drop, StopPolicy::Drop]
    );

    for channel in 0..4 {
        for policy in [StopPolicy::Buffer, StopPolicy::Drop] {
            block
                .set_channel_stop_policy(policy, ChannelSelect::Single(channel))
                .expect("set policy");
            assert_eq!(block.get_channel_stop_policy(channel).expect("policy"), policy);
        }
    }

    block
        .set_channel_stop_policy(StopPolicy::Buffer, ChannelSelect::All)
        .expect("set all");
    for channel in 0..4 {
        assert_eq!(
            block.get_channel_stop_policy(channel).expect("policy"),
            StopPolicy::Buffer
        );
    }

    block
        .set_channel_stop_policy(StopPolicy::Drop, ChannelSelect::All)
        .expect("set all");
    assert!(block
        .get_channel_stop_policies()
        .expect("policies")
        .iter()
        .all(|&policy| policy == StopPolicy::Drop));
}

#[test]
fn test_timestamp_queue_status_from_one_word() {
    let (mut block, core) = open();
    core.set_hw(register_address(2, regs::CHAN_TS_QUEUE_STS), 64 << 16 | 5);

    assert_eq!(
        block.get_timestamp_queue_status(2).expect("status"),
        TimestampQueueStatus {
            fullness: 5,
            capacity: 64
        }
    );
    assert_eq!(block.get_timestamp_queue_fullness_all().expect("fullness"), vec![0, 0, 5, 0]);
    assert_eq!(block.get_timestamp_queue_size_all().expect("size"), vec![0, 0, 64, 0]);
}

#[test]
fn test_fan_out_is_not_atomic() {
    let (mut block, core) = open();
    core.fail_after(2);

    let err = block.tx_datapath_enable(true, ChannelSelect::All).unwrap_err();
    assert!(matches!(err, AuroraError::Transfer { .. }));
    assert_eq!(
        core.write_log(),
        vec![
            (register_address(0, regs::CHAN_TX_CTRL), 0x1),
            (register_address(1, regs::CHAN_TX_CTRL), 0x1),
        ]
    );
}

// ── Properties ───────────────────────────────────────────────────────────────

#[test]
fn test_property_keys() {
    let (block, _core) = open();
    let keys: Vec<_> = block.property_keys().collect();
    assert_eq!(keys.len(), 9);
    assert!(keys.contains(&"fc_pause_count"));
    assert!(keys.contains(&"crc_error_counter"));
}

#[test]
fn test_writable_property_returns_cached_value() {
    let (mut block, _core) = open();

    block
        .set_property("fc_pause_threshold", PropertyValue::U16(1000))
        .expect("set pause threshold");
    block
        .set_property("fc_resume_threshold", PropertyValue::U16(2000))
        .expect("set resume threshold");

    assert_eq!(
        block.get_property("fc_pause_threshold").expect("get"),
        PropertyValue::U16(1000)
    );
    assert_eq!(
        block.get_property("fc_resume_threshold").expect("get"),
        PropertyValue::U16(2000)
    );
    assert_eq!(
        block.property_record("fc_pause_threshold").expect("record").source,
        PropertySource::ExternallySet
    );

    // Hardware keeps only the low byte of each
    assert_eq!(block.get_fc_pause_threshold().expect("hw"), 1000 & 0xFF);
    assert_eq!(block.get_fc_resume_threshold().expect("hw"), 2000 & 0xFF);
}

#[test]
fn test_read_only_property_rereads_hardware() {
    let (mut block, core) = open();

    core.set_hw(regs::RX_PKT_CTR, 7);
    assert_eq!(block.get_property("rx_packet_counter").expect("get"), PropertyValue::U32(7));
    core.set_hw(regs::RX_PKT_CTR, 8);
    assert_eq!(block.get_property("rx_packet_counter").expect("get"), PropertyValue::U32(8));
    assert_eq!(block.get_property("num_channels").expect("get"), PropertyValue::Usize(4));
}

#[test]
fn test_property_rejections() {
    let (mut block, core) = open();

    let err = block
        .set_property("rx_packet_counter", PropertyValue::U32(0))
        .unwrap_err();
    assert!(matches!(err, AuroraError::ReadOnlyProperty { .. }));

    let err = block
        .set_property("fc_pause_count", PropertyValue::U16(10))
        .unwrap_err();
    assert!(matches!(err, AuroraError::PropertyType { expected: "u8", .. }));

    let err = block.get_property("sample_rate").unwrap_err();
    assert!(matches!(err, AuroraError::UnknownProperty { .. }));

    let err = block
        .set_property("fc_pause_count", PropertyValue::U8(5))
        .unwrap_err();
    assert!(matches!(err, AuroraError::InvalidPauseCount { value: 5 }));

    assert!(core.write_log().is_empty());
    let record = block.property_record("fc_pause_count").expect("record");
    assert_eq!(record.value, PropertyValue::U8(100));
    assert_eq!(record.source, PropertySource::OwnerSet);
}

#[test]
fn test_failed_push_leaves_cache_unchanged() {
    let (mut block, core) = open();
    core.fail_after(0);

    let err = block
        .set_property("fc_pause_count", PropertyValue::U8(20))
        .unwrap_err();
    assert!(matches!(err, AuroraError::Transfer { .. }));
    assert_eq!(
        block.get_property("fc_pause_count").expect("get"),
        PropertyValue::U8(100)
    );
}
