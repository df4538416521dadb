/// Static per-instance-type facts used to size the kubelet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceCapacity {
    /// Elastic network interfaces the instance can attach.
    pub enis: u32,
    /// IPv4 addresses per interface.
    pub ips_per_eni: u32,
    pub cores: u32,
    pub memory_mib: u64,
}

const fn cap(enis: u32, ips_per_eni: u32, cores: u32, memory_mib: u64) -> InstanceCapacity {
    InstanceCapacity {
        enis,
        ips_per_eni,
        cores,
        memory_mib,
    }
}

// https://docs.aws.amazon.com/AWSEC2/latest/UserGuide/using-eni.html
static INSTANCE_TYPES: &[(&str, InstanceCapacity)] = &[
    ("a1.medium", cap(2, 4, 1, 2048)),
    ("a1.large", cap(3, 10, 2, 4096)),
    ("a1.xlarge", cap(4, 15, 4, 8192)),
    ("c4.large", cap(3, 10, 2, 3840)),
    ("c4.xlarge", cap(4, 15, 4, 7680)),
    ("c4.2xlarge", cap(4, 15, 8, 15360)),
    ("c4.4xlarge", cap(8, 30, 16, 30720)),
    ("c4.8xlarge", cap(8, 30, 36, 61440)),
    ("c5.large", cap(3, 10, 2, 4096)),
    ("c5.xlarge", cap(4, 15, 4, 8192)),
    ("c5.2xlarge", cap(4, 15, 8, 16384)),
    ("c5.4xlarge", cap(8, 30, 16, 32768)),
    ("c5.9xlarge", cap(8, 30, 36, 73728)),
    ("c5.12xlarge", cap(8, 30, 48, 98304)),
    ("c5.18xlarge", cap(15, 50, 72, 147456)),
    ("c5.24xlarge", cap(15, 50, 96, 196608)),
    ("c5a.large", cap(3, 10, 2, 4096)),
    ("c5a.xlarge", cap(4, 15, 4, 8192)),
    ("c5a.2xlarge", cap(4, 15, 8, 16384)),
    ("c5a.4xlarge", cap(8, 30, 16, 32768)),
    ("c5a.8xlarge", cap(8, 30, 32, 65536)),
    ("c5a.12xlarge", cap(8, 30, 48, 98304)),
    ("c5a.16xlarge", cap(15, 50, 64, 131072)),
    ("c5a.24xlarge", cap(15, 50, 96, 196608)),
    ("c5n.large", cap(3, 10, 2, 5376)),
    ("c5n.xlarge", cap(4, 15, 4, 10752)),
    ("c5n.2xlarge", cap(4, 15, 8, 21504)),
    ("c5n.4xlarge", cap(8, 30, 16, 43008)),
    ("c5n.9xlarge", cap(8, 30, 36, 98304)),
    ("c5n.18xlarge", cap(15, 50, 72, 196608)),
    ("c6g.medium", cap(2, 4, 1, 2048)),
    ("c6g.large", cap(3, 10, 2, 4096)),
    ("c6g.xlarge", cap(4, 15, 4, 8192)),
    ("c6g.2xlarge", cap(4, 15, 8, 16384)),
    ("c6g.4xlarge", cap(8, 30, 16, 32768)),
    ("c6g.8xlarge", cap(8, 30, 32, 65536)),
    ("c6g.12xlarge", cap(8, 30, 48, 98304)),
    ("c6g.16xlarge", cap(15, 50, 64, 131072)),
    ("c6i.large", cap(3, 10, 2, 4096)),
    ("c6i.xlarge", cap(4, 15, 4, 8192)),
    ("c6i.2xlarge", cap(4, 15, 8, 16384)),
    ("c6i.4xlarge", cap(8, 30, 16, 32768)),
    ("c6i.8xlarge", cap(8, 30, 32, 65536)),
    ("c6i.12xlarge", cap(8, 30, 48, 98304)),
    ("c6i.16xlarge", cap(15, 50, 64, 131072)),
    ("c6i.24xlarge", cap(15, 50, 96, 196608)),
    ("c6i.32xlarge", cap(15, 50, 128, 262144)),
    ("h1.4xlarge", cap(8, 30, 16, 65536)),
    ("i3.large", cap(3, 10, 2, 15616)),
    ("i3.8xlarge", cap(8, 30, 32, 249856)),
    ("m3.medium", cap(2, 6, 1, 3840)),
    ("m4.large", cap(2, 10, 2, 8192)),
    ("m4.xlarge", cap(4, 15, 4, 16384)),
    ("m4.2xlarge", cap(4, 15, 8, 32768)),
    ("m5.large", cap(3, 10, 2, 8192)),
    ("m5.xlarge", cap(4, 15, 4, 16384)),
    ("m5.2xlarge", cap(4, 15, 8, 32768)),
    ("m5.4xlarge", cap(8, 30, 16, 65536)),
    ("m5.8xlarge", cap(8, 30, 32, 131072)),
    ("m5.12xlarge", cap(8, 30, 48, 196608)),
    ("m5.16xlarge", cap(15, 50, 64, 262144)),
    ("m5.24xlarge", cap(15, 50, 96, 393216)),
    ("m5a.large", cap(3, 10, 2, 8192)),
    ("m5a.xlarge", cap(4, 15, 4, 16384)),
    ("m5a.2xlarge", cap(4, 15, 8, 32768)),
    ("m5a.4xlarge", cap(8, 30, 16, 65536)),
    ("m5a.8xlarge", cap(8, 30, 32, 131072)),
    ("m5a.12xlarge", cap(8, 30, 48, 196608)),
    ("m5a.16xlarge", cap(15, 50, 64, 262144)),
    ("m5a.24xlarge", cap(15, 50, 96, 393216)),
    ("m5d.large", cap(3, 10, 2, 8192)),
    ("m5d.xlarge", cap(4, 15, 4, 16384)),
    ("m5d.2xlarge", cap(4, 15, 8, 32768)),
    ("m5d.4xlarge", cap(8, 30, 16, 65536)),
    ("m5d.8xlarge", cap(8, 30, 32, 131072)),
    ("m5d.12xlarge", cap(8, 30, 48, 196608)),
    ("m5d.16xlarge", cap(15, 50, 64, 262144)),
    ("m5d.24xlarge", cap(15, 50, 96, 393216)),
    ("m5n.large", cap(3, 10, 2, 8192)),
    ("m5n.xlarge", cap(4, 15, 4, 16384)),
    ("m5n.2xlarge", cap(4, 15, 8, 32768)),
    ("m5n.4xlarge", cap(8, 30, 16, 65536)),
    ("m5n.8xlarge", cap(8, 30, 32, 131072)),
    ("m5n.12xlarge", cap(8, 30, 48, 196608)),
    ("m5n.16xlarge", cap(15, 50, 64, 262144)),
    ("m5n.24xlarge", cap(15, 50, 96, 393216)),
    ("m6g.medium", cap(2, 4, 1, 4096)),
    ("m6g.large", cap(3, 10, 2, 8192)),
    ("m6g.xlarge", cap(4, 15, 4, 16384)),
    ("m6g.2xlarge", cap(4, 15, 8, 32768)),
    ("m6g.4xlarge", cap(8, 30, 16, 65536)),
    ("m6g.8xlarge", cap(8, 30, 32, 131072)),
    ("m6g.12xlarge", cap(8, 30, 48, 196608)),
    ("m6g.16xlarge", cap(15, 50, 64, 262144)),
    ("m6i.large", cap(3, 10, 2, 8192)),
    ("m6i.xlarge", cap(4, 15, 4, 16384)),
    ("m6i.2xlarge", cap(4, 15, 8, 32768)),
    ("m6i.4xlarge", cap(8, 30, 16, 65536)),
    ("m6i.8xlarge", cap(8, 30, 32, 131072)),
    ("m6i.12xlarge", cap(8, 30, 48, 196608)),
    ("m6i.16xlarge", cap(15, 50, 64, 262144)),
    ("m6i.24xlarge", cap(15, 50, 96, 393216)),
    ("m6i.32xlarge", cap(15, 50, 128, 524288)),
    ("r5.large", cap(3, 10, 2, 16384)),
    ("r5.xlarge", cap(4, 15, 4, 32768)),
    ("r5.2xlarge", cap(4, 15, 8, 65536)),
    ("r5.4xlarge", cap(8, 30, 16, 131072)),
    ("r5.8xlarge", cap(8, 30, 32, 262144)),
    ("r5.12xlarge", cap(8, 30, 48, 393216)),
    ("r5.16xlarge", cap(15, 50, 64, 524288)),
    ("r5.24xlarge", cap(15, 50, 96, 786432)),
    ("r5a.large", cap(3, 10, 2, 16384)),
    ("r5a.xlarge", cap(4, 15, 4, 32768)),
    ("r5a.2xlarge", cap(4, 15, 8, 65536)),
    ("r5a.4xlarge", cap(8, 30, 16, 131072)),
    ("r5a.8xlarge", cap(8, 30, 32, 262144)),
    ("r5a.12xlarge", cap(8, 30, 48, 393216)),
    ("r5a.16xlarge", cap(15, 50, 64, 524288)),
    ("r5a.24xlarge", cap(15, 50, 96, 786432)),
    ("r5n.large", cap(3, 10, 2, 16384)),
    ("r5n.xlarge", cap(4, 15, 4, 32768)),
    ("r5n.2xlarge", cap(4, 15, 8, 65536)),
    ("r5n.4xlarge", cap(8, 30, 16, 131072)),
    ("r5n.8xlarge", cap(8, 30, 32, 262144)),
    ("r5n.12xlarge", cap(8, 30, 48, 393216)),
    ("r5n.16xlarge", cap(15, 50, 64, 524288)),
    ("r5n.24xlarge", cap(15, 50, 96, 786432)),
    ("r6g.medium", cap(2, 4, 1, 8192)),
    ("r6g.large", cap(3, 10, 2, 16384)),
    ("r6g.xlarge", cap(4, 15, 4, 32768)),
    ("r6g.2xlarge", cap(4, 15, 8, 65536)),
    ("r6g.4xlarge", cap(8, 30, 16, 131072)),
    ("r6g.8xlarge", cap(8, 30, 32, 262144)),
    ("r6g.12xlarge", cap(8, 30, 48, 393216)),
    ("r6g.16xlarge", cap(15, 50, 64, 524288)),
    ("r6i.large", cap(3, 10, 2, 16384)),
    ("r6i.xlarge", cap(4, 15, 4, 32768)),
    ("r6i.2xlarge", cap(4, 15, 8, 65536)),
    ("r6i.4xlarge", cap(8, 30, 16, 131072)),
    ("r6i.8xlarge", cap(8, 30, 32, 262144)),
    ("r6i.12xlarge", cap(8, 30, 48, 393216)),
    ("r6i.16xlarge", cap(15, 50, 64, 524288)),
    ("r6i.24xlarge", cap(15, 50, 96, 786432)),
    ("r6i.32xlarge", cap(15, 50, 128, 1048576)),
    ("t2.micro", cap(2, 2, 1, 1024)),
    ("t2.small", cap(3, 4, 1, 2048)),
    ("t2.medium", cap(3, 6, 2, 4096)),
    ("t2.large", cap(3, 12, 2, 8192)),
    ("t3.nano", cap(2, 2, 2, 512)),
    ("t3.micro", cap(2, 2, 2, 1024)),
    ("t3.small", cap(3, 4, 2, 2048)),
    ("t3.medium", cap(3, 6, 2, 4096)),
    ("t3.large", cap(3, 12, 2, 8192)),
    ("t3.xlarge", cap(4, 15, 4, 16384)),
    ("t3.2xlarge", cap(4, 15, 8, 32768)),
    ("t3a.nano", cap(2, 2, 2, 512)),
    ("t3a.micro", cap(2, 2, 2, 1024)),
    ("t3a.small", cap(2, 4, 2, 2048)),
    ("t3a.medium", cap(3, 6, 2, 4096)),
    ("t3a.large", cap(3, 12, 2, 8192)),
    ("t3a.xlarge", cap(4, 15, 4, 16384)),
    ("t3a.2xlarge", cap(4, 15, 8, 32768)),
    ("x1.16xlarge", cap(8, 30, 64, 999424)),
    ("x1e.32xlarge", cap(8, 30, 128, 3997696)),
];

pub fn lookup(instance_type: &str) -> Option<&'static InstanceCapacity> {
    INSTANCE_TYPES
        .iter()
        .find(|(name, _)| *name == instance_type)
        .map(|(_, capacity)| capacity)
}
