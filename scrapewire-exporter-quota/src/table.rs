//! OpenStack project quota fields.
//!
//! Both tables publish the same metric names; they differ only in the keys
//! the script prints.

use scrapewire_framework::FieldSpec;

pub static FIELDS: &[FieldSpec] = &[
    FieldSpec::gauge("cpus_total", "cpus_total", "Total assigned VCPUs"),
    FieldSpec::gauge("cpus_used", "cpus_used", "Used VCPUs"),
    FieldSpec::gauge("ram_total_gbytes", "ram_total_gbytes", "Total assigned RAM in gigabytes"),
    FieldSpec::gauge("ram_used_gbytes", "ram_used_gbytes", "Used RAM in gigabytes"),
    FieldSpec::gauge("instances_total", "instances_total", "Total assigned instances"),
    FieldSpec::gauge("instances_used", "instances_used", "Used instances"),
    FieldSpec::gauge("volumes_total", "volumes_total", "Total assigned volumes"),
    FieldSpec::gauge("volumes_used", "volumes_used", "Used volumes"),
    FieldSpec::gauge("volumes_size_total_gbytes", "volumes_size_total_gbytes", "Total assigned volume size in gigabytes"),
    FieldSpec::gauge("volumes_size_used_gbytes", "volumes_size_used_gbytes", "Used volume size in gigabytes"),
    FieldSpec::gauge("shares_total", "shares_total", "Total assigned shares"),
    FieldSpec::gauge("shares_used", "shares_used", "Used shares"),
    FieldSpec::gauge("shares_size_total_gbytes", "shares_size_total_gbytes", "Total assigned share size in gigabytes"),
    FieldSpec::gauge("shares_size_used_gbytes", "shares_size_used_gbytes", "Used share size in gigabytes"),
];

/// Keys printed by the older JSON quota script.
pub static LEGACY_FIELDS: &[FieldSpec] = &[
    FieldSpec::gauge("cpus_total", "total_cpus", "Total assigned VCPUs"),
    FieldSpec::gauge("cpus_used", "cpus_used", "Used VCPUs"),
    FieldSpec::gauge("ram_total_gbytes", "total_ram", "Total assigned RAM in gigabytes"),
    FieldSpec::gauge("ram_used_gbytes", "ram_used", "Used RAM in gigabytes"),
    FieldSpec::gauge("instances_total", "total_instances", "Total assigned instances"),
    FieldSpec::gauge("instances_used", "instances_used", "Used instances"),
    FieldSpec::gauge("volumes_total", "total_volume", "Total assigned volumes"),
    FieldSpec::gauge("volumes_used", "volumes_used", "Used volumes"),
    FieldSpec::gauge("volumes_size_total_gbytes", "total_volume_size", "Total assigned volume size in gigabytes"),
    FieldSpec::gauge("volumes_size_used_gbytes", "total_volume_size_used", "Used volume size in gigabytes"),
    FieldSpec::gauge("shares_total", "total_shares", "Total assigned shares"),
    FieldSpec::gauge("shares_used", "shares_used", "Used shares"),
    FieldSpec::gauge("shares_size_total_gbytes", "shares_size", "Total assigned share size in gigabytes"),
    FieldSpec::gauge("shares_size_used_gbytes", "shares_size_used", "Used share size in gigabytes"),
];
