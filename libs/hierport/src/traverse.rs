//! Hierarchy walks that produce [`HierPortInst`]s.

use std::collections::HashSet;

use arcstr::ArcStr;
use edif::{CellId, NetId, Netlist};
use tracing::{span, Level};

use crate::{join, HierPortInst, EDIF_HIER_SEP};

/// Collects a reference to every port instance on a leaf cell instance,
/// walking depth first from the netlist's top instance.
///
/// Leaf cells are cells with no instances of their own. Each reference
/// carries the hierarchical name of the scope containing its instance,
/// so [`HierPortInst::full_hier_name`] names the leaf instance itself.
///
/// Returns an empty list if the netlist has no top instance. An instance of a
/// cell that is already being walked, as in a recursive hierarchy, is skipped
/// with a warning; see [`Netlist::validate`](edif::Netlist::validate).
pub fn leaf_port_insts(netlist: &Netlist) -> Vec<HierPortInst<'_>> {
    let _guard = span!(Level::DEBUG, "collecting leaf port instances", netlist = %netlist.name())
        .entered();
    let mut out = Vec::new();
    let Some(top) = netlist.top_cell() else {
        tracing::warn!(netlist = %netlist.name(), "netlist has no top instance");
        return out;
    };
    let mut path = HashSet::from([top]);
    collect_leaves(netlist, top, ArcStr::new(), &mut path, &mut out);
    tracing::debug!(count = out.len(), "collected leaf port instances");
    out
}

fn collect_leaves<'a>(
    netlist: &'a Netlist,
    cell: CellId,
    hier_name: ArcStr,
    path: &mut HashSet<CellId>,
    out: &mut Vec<HierPortInst<'a>>,
) {
    for &inst in netlist.cell(cell).cell_insts() {
        let inst = netlist.cell_inst(inst);
        let child = inst.cell_type();
        if netlist.cell(child).is_leaf() {
            out.extend(
                inst.port_insts()
                    .iter()
                    .map(|&port_inst| HierPortInst::new(netlist, hier_name.clone(), port_inst)),
            );
        } else if path.insert(child) {
            let child_name = join(&hier_name, EDIF_HIER_SEP, inst.name());
            collect_leaves(netlist, child, child_name, path, out);
            path.remove(&child);
        } else {
            tracing::warn!(
                cell = %netlist.cell(child).name(),
                inst = %join(&hier_name, EDIF_HIER_SEP, inst.name()),
                "skipping recursive instance"
            );
        }
    }
}

/// References to every port instance attached to a local net, as seen from
/// the scope `hier_name`.
///
/// This includes the inward-facing port instances of the net's own cell.
pub fn port_insts_on_net<'a>(
    netlist: &'a Netlist,
    hier_name: impl Into<ArcStr>,
    net: NetId,
) -> Vec<HierPortInst<'a>> {
    let hier_name = hier_name.into();
    netlist
        .net(net)
        .port_insts()
        .iter()
        .map(|&port_inst| HierPortInst::new(netlist, hier_name.clone(), port_inst))
        .collect()
}
