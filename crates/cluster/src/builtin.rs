//! Built-in version catalogue
//!
//! To add a version:
//! - Add a key at the end of [`VersionKey`].
//! - Add its entry at the end of [`BUILTIN_CATALOGUE`].
//! - For a new major or minor release, bump the default minimum supported
//!   key in `RegistryConfig`. For example, when introducing the `2.2`
//!   release, bump it from `2.0` to `2.1`.
//!
//! To remove a version:
//! - Remove its runtime checks.
//! - If it is not the newest entry, delete the key, comment out its entry
//!   and mark it "Removed." so its historical slot stays visible.
//!
//! An unstable version such as `1.1-2` was developed after `1.1` shipped and
//! is not part of any release until the next stable version. Patch releases
//! (`1.1.2`) have no associated migrations.

use crate::catalogue::CatalogueEntry;
use crate::key::GateKey;
use strata_core::Version;

/// Gate keys of the built-in catalogue, in chronological order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionKey {
    /// Any binary older than 1.0-1
    VersionBase,
    /// Raft hard state is written below Raft
    VersionSplitHardStateBelowRaft,
    /// Replica rebalancing uses range statistics
    VersionStatsBasedRebalancing,
    /// The 1.1 release
    Version1_1,
    /// MVCC stats carry network counters
    VersionMVCCNetworkStats,
    /// RPC layer reports network stats
    VersionRPCNetworkStats,
    /// Peers check each other's version on connect
    VersionRPCVersionCheck,
    /// Ranged clear requests
    VersionClearRange,
    /// Table partitioning descriptors and subzone configs
    VersionPartitioning,
    /// Stats recomputation requests
    VersionRecomputeStats,
    /// Zone constraints per replica
    VersionPerReplicaZoneConstraints,
    /// Lease placement preferences
    VersionLeasePreferences,
    /// The 2.0 release
    Version2_0,
    /// Import can skip malformed records
    VersionImportSkipRecords,
    /// Lease requests carry the proposed timestamp
    VersionProposedTSLeaseRequest,
    /// Range applied state kept under a single key
    VersionRangeAppliedStateKey,
    /// Additional import formats
    VersionImportFormats,
    /// Lookup joins on secondary indexes
    VersionSecondaryLookupJoins,
    /// Columnar time series storage
    VersionColumnarTimeSeries,
    /// Batch responses carry headers
    VersionBatchResponse,
    /// Changefeed creation
    VersionCreateChangefeed,
    /// Bit array column type
    VersionBitArrayColumns,
    /// Replica rebalancing on load
    VersionLoadBasedRebalancing,
    /// The 2.1 release
    Version2_1,
    /// Zone configs inherit from parents
    VersionCascadingZoneConfigs,
    /// Ranges split on load
    VersionLoadSplits,
    /// Workload export storage
    VersionExportStorageWorkload,
    /// Transaction records are written lazily
    VersionLazyTxnRecord,
    /// Reads carry sequence numbers
    VersionSequencedReads,
    /// Log truncated state moves to unreplicated storage
    VersionUnreplicatedRaftTruncatedState,
    /// Statistics creation
    VersionCreateStats,
}

impl GateKey for VersionKey {
    fn name(&self) -> &'static str {
        match self {
            VersionKey::VersionBase => "VersionBase",
            VersionKey::VersionSplitHardStateBelowRaft => "VersionSplitHardStateBelowRaft",
            VersionKey::VersionStatsBasedRebalancing => "VersionStatsBasedRebalancing",
            VersionKey::Version1_1 => "Version1_1",
            VersionKey::VersionMVCCNetworkStats => "VersionMVCCNetworkStats",
            VersionKey::VersionRPCNetworkStats => "VersionRPCNetworkStats",
            VersionKey::VersionRPCVersionCheck => "VersionRPCVersionCheck",
            VersionKey::VersionClearRange => "VersionClearRange",
            VersionKey::VersionPartitioning => "VersionPartitioning",
            VersionKey::VersionRecomputeStats => "VersionRecomputeStats",
            VersionKey::VersionPerReplicaZoneConstraints => "VersionPerReplicaZoneConstraints",
            VersionKey::VersionLeasePreferences => "VersionLeasePreferences",
            VersionKey::Version2_0 => "Version2_0",
            VersionKey::VersionImportSkipRecords => "VersionImportSkipRecords",
            VersionKey::VersionProposedTSLeaseRequest => "VersionProposedTSLeaseRequest",
            VersionKey::VersionRangeAppliedStateKey => "VersionRangeAppliedStateKey",
            VersionKey::VersionImportFormats => "VersionImportFormats",
            VersionKey::VersionSecondaryLookupJoins => "VersionSecondaryLookupJoins",
            VersionKey::VersionColumnarTimeSeries => "VersionColumnarTimeSeries",
            VersionKey::VersionBatchResponse => "VersionBatchResponse",
            VersionKey::VersionCreateChangefeed => "VersionCreateChangefeed",
            VersionKey::VersionBitArrayColumns => "VersionBitArrayColumns",
            VersionKey::VersionLoadBasedRebalancing => "VersionLoadBasedRebalancing",
            VersionKey::Version2_1 => "Version2_1",
            VersionKey::VersionCascadingZoneConfigs => "VersionCascadingZoneConfigs",
            VersionKey::VersionLoadSplits => "VersionLoadSplits",
            VersionKey::VersionExportStorageWorkload => "VersionExportStorageWorkload",
            VersionKey::VersionLazyTxnRecord => "VersionLazyTxnRecord",
            VersionKey::VersionSequencedReads => "VersionSequencedReads",
            VersionKey::VersionUnreplicatedRaftTruncatedState => {
                "VersionUnreplicatedRaftTruncatedState"
            }
            VersionKey::VersionCreateStats => "VersionCreateStats",
        }
    }
}

const fn v(major: u32, minor: u32, unstable: u32) -> Version {
    Version::from_parts(major, minor, 0, unstable)
}

use VersionKey::*;

/// Every live gate, oldest first
pub static BUILTIN_CATALOGUE: &[CatalogueEntry<VersionKey>] = &[
    CatalogueEntry::new(
        VersionBase,
        v(1, 0, 0),
        "binaries older than 1.0-1, which predate cluster versioning",
    ),
    // Removed.
    // VersionRaftLogTruncationBelowRaft at 1.0-1
    CatalogueEntry::new(
        VersionSplitHardStateBelowRaft,
        v(1, 0, 2),
        "write the raft hard state below raft",
    ),
    CatalogueEntry::new(
        VersionStatsBasedRebalancing,
        v(1, 0, 3),
        "rebalance replicas using range statistics",
    ),
    CatalogueEntry::new(Version1_1, v(1, 1, 0), "release 1.1, used for all 1.1.x patches"),
    // Removed.
    // VersionRaftLastIndex at 1.1-1
    CatalogueEntry::new(
        VersionMVCCNetworkStats,
        v(1, 1, 2),
        "track network counters in MVCC stats",
    ),
    // Removed.
    // VersionMeta2Splits at 1.1-3
    CatalogueEntry::new(
        VersionRPCNetworkStats,
        v(1, 1, 4),
        "report network stats over RPC",
    ),
    CatalogueEntry::new(
        VersionRPCVersionCheck,
        v(1, 1, 5),
        "check peer versions when a connection is established",
    ),
    CatalogueEntry::new(VersionClearRange, v(1, 1, 6), "ranged clear requests"),
    // Writes table descriptors with a partitioning scheme and zone configs
    // with index or partition subzones. Clusters using partitioning before
    // 2.0 should expect to be wiped after every 1.1-X upgrade.
    CatalogueEntry::new(
        VersionPartitioning,
        v(1, 1, 7),
        "table partitioning and subzone configs",
    ),
    // Removed.
    // VersionLeaseSequence at 1.1-8
    // Removed.
    // VersionUnreplicatedTombstoneKey at 1.1-9
    CatalogueEntry::new(VersionRecomputeStats, v(1, 1, 10), "stats recomputation requests"),
    // Removed.
    // VersionNoRaftProposalKeys at 1.1-11
    // Removed.
    // VersionTxnSpanRefresh at 1.1-12
    // Removed.
    // VersionReadUncommittedRangeLookups at 1.1-13
    CatalogueEntry::new(
        VersionPerReplicaZoneConstraints,
        v(1, 1, 14),
        "zone constraints per replica",
    ),
    CatalogueEntry::new(VersionLeasePreferences, v(1, 1, 15), "lease placement preferences"),
    CatalogueEntry::new(Version2_0, v(2, 0, 0), "release 2.0, used for all 2.0.x patches"),
    CatalogueEntry::new(
        VersionImportSkipRecords,
        v(2, 0, 1),
        "import can skip malformed records",
    ),
    CatalogueEntry::new(
        VersionProposedTSLeaseRequest,
        v(2, 0, 2),
        "lease requests carry the proposed timestamp",
    ),
    CatalogueEntry::new(
        VersionRangeAppliedStateKey,
        v(2, 0, 3),
        "keep range applied state under a single key",
    ),
    CatalogueEntry::new(VersionImportFormats, v(2, 0, 4), "additional import formats"),
    CatalogueEntry::new(
        VersionSecondaryLookupJoins,
        v(2, 0, 5),
        "lookup joins on secondary indexes",
    ),
    // Removed.
    // VersionClientSideWritingFlag at 2.0-6
    CatalogueEntry::new(
        VersionColumnarTimeSeries,
        v(2, 0, 7),
        "columnar time series storage",
    ),
    // Removed.
    // VersionTxnCoordMetaInvalidField at 2.0-8
    // Removed.
    // VersionAsyncConsensus at 2.0-9
    CatalogueEntry::new(VersionBatchResponse, v(2, 0, 10), "batch responses carry headers"),
    CatalogueEntry::new(VersionCreateChangefeed, v(2, 0, 11), "changefeed creation"),
    // Removed.
    // VersionRangeMerges at 2.0-12
    CatalogueEntry::new(VersionBitArrayColumns, v(2, 0, 13), "bit array column type"),
    CatalogueEntry::new(
        VersionLoadBasedRebalancing,
        v(2, 0, 14),
        "rebalance replicas on load",
    ),
    CatalogueEntry::new(Version2_1, v(2, 1, 0), "release 2.1, used for all 2.1.x patches"),
    CatalogueEntry::new(
        VersionCascadingZoneConfigs,
        v(2, 1, 1),
        "zone configs inherit from their parents",
    ),
    CatalogueEntry::new(VersionLoadSplits, v(2, 1, 2), "split ranges on load"),
    CatalogueEntry::new(
        VersionExportStorageWorkload,
        v(2, 1, 3),
        "workload export storage",
    ),
    CatalogueEntry::new(
        VersionLazyTxnRecord,
        v(2, 1, 4),
        "write transaction records lazily",
    ),
    CatalogueEntry::new(
        VersionSequencedReads,
        v(2, 1, 5),
        "reads carry sequence numbers",
    ),
    // Moves the log truncated state into unreplicated storage on log
    // truncation. See strata_migration::truncated_state for the migration.
    CatalogueEntry::new(
        VersionUnreplicatedRaftTruncatedState,
        v(2, 1, 6),
        "keep the log truncated state in unreplicated storage",
    ),
    CatalogueEntry::new(VersionCreateStats, v(2, 1, 7), "statistics creation"),
    // Add new versions here.
];
