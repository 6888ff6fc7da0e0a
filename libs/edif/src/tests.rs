use test_log::test;

use crate::validation::Cause;
use crate::*;

/// A two-level netlist: `top` contains `u_reg` (a `reg4`), which contains
/// four `FDRE` flops driving a descending output bus.
fn reg4_netlist() -> (Netlist, CellId, CellId) {
    let mut netlist = Netlist::new("reg4_design");
    let prims = netlist.add_library("hdi_primitives");
    let work = netlist.add_library("work");

    let fdre = netlist.add_cell(prims, "FDRE");
    for (name, dir) in [
        ("C", Direction::Input),
        ("CE", Direction::Input),
        ("D", Direction::Input),
        ("R", Direction::Input),
        ("Q", Direction::Output),
    ] {
        netlist.add_port(fdre, name, dir).unwrap();
    }

    let reg4 = netlist.add_cell(work, "reg4");
    netlist.add_port(reg4, "clk", Direction::Input).unwrap();
    netlist.add_port(reg4, "d[3:0]", Direction::Input).unwrap();
    netlist.add_port(reg4, "q[3:0]", Direction::Output).unwrap();

    let clk = netlist.add_net(reg4, "clk");
    netlist.connect_boundary(clk, "clk", 0).unwrap();
    for i in 0..4 {
        let ff = netlist.add_cell_inst(reg4, format!("ff{i}"), fdre);
        netlist.connect_inst(clk, ff, "C", 0).unwrap();

        let d = netlist.add_net(reg4, format!("d{i}"));
        netlist.connect_boundary(d, "d", 3 - i).unwrap();
        netlist.connect_inst(d, ff, "D", 0).unwrap();

        let q = netlist.add_net(reg4, format!("q{i}"));
        netlist.connect_inst(q, ff, "Q", 0).unwrap();
        netlist.connect_boundary(q, "q", 3 - i).unwrap();
    }

    let top = netlist.add_cell(work, "top");
    netlist.add_port(top, "clk", Direction::Input).unwrap();
    let u_reg = netlist.add_cell_inst(top, "u_reg", reg4);
    let top_clk = netlist.add_net(top, "clk");
    netlist.connect_boundary(top_clk, "clk", 0).unwrap();
    netlist.connect_inst(top_clk, u_reg, "clk", 0).unwrap();
    netlist.set_top_cell(top);

    (netlist, top, reg4)
}

#[test]
fn parse_port_names() {
    let mut netlist = Netlist::new("ports");
    let lib = netlist.add_library("work");
    let cell = netlist.add_cell(lib, "cell");

    let scalar = netlist.add_port(cell, "en", Direction::Input).unwrap();
    let desc = netlist.add_port(cell, "data[7:0]", Direction::Output).unwrap();
    let asc = netlist.add_port(cell, "addr[0:3]", Direction::Input).unwrap();

    let scalar = netlist.port(scalar);
    assert_eq!(scalar.width(), 1);
    assert!(!scalar.is_bus());
    assert_eq!(scalar.bus_name(), "en");

    let desc = netlist.port(desc);
    assert_eq!(desc.width(), 8);
    assert_eq!(desc.bus_name(), "data");
    assert_eq!(desc.bit_order(), BitOrder::Descending);
    assert_eq!(desc.member_name(2), "data[5]");

    let asc = netlist.port(asc);
    assert_eq!(asc.width(), 4);
    assert_eq!(asc.bit_order(), BitOrder::Ascending);
    assert_eq!(asc.member_name(2), "addr[2]");
}

#[test]
fn reject_bad_port_names() {
    let mut netlist = Netlist::new("ports");
    let lib = netlist.add_library("work");
    let cell = netlist.add_cell(lib, "cell");

    assert!(matches!(
        netlist.add_port(cell, "data[7:", Direction::Input),
        Err(Error::InvalidPortName(_))
    ));
    assert!(matches!(
        netlist.add_port(cell, "[3:0]", Direction::Input),
        Err(Error::InvalidPortName(_))
    ));
    assert!(matches!(
        netlist.add_port(cell, "data[7:4]", Direction::Input),
        Err(Error::UnsupportedBusRange { .. })
    ));

    netlist.add_port(cell, "data[3:0]", Direction::Input).unwrap();
    assert!(matches!(
        netlist.add_port(cell, "data", Direction::Output),
        Err(Error::DuplicatePort { .. })
    ));
}

#[test]
fn port_inst_names() {
    let (netlist, _, reg4) = reg4_netlist();

    let ff0 = netlist.cell_inst_named(reg4, "ff0").unwrap();
    let d_pin = netlist.cell_inst(ff0).port_insts()[1];
    assert_eq!(netlist.port_inst_name(d_pin), "D");
    assert_eq!(netlist.port_inst_full_name(d_pin), "ff0/D");

    // `d` member 3 of `d[3:0]` is bit 0.
    let d0 = netlist.net_named(reg4, "d0").unwrap();
    let boundary = netlist.net(d0).port_insts()[0];
    assert_eq!(netlist.port_inst(boundary).cell_inst(), None);
    assert_eq!(netlist.port_inst(boundary).index(), 3);
    assert_eq!(netlist.port_inst_full_name(boundary), "d[0]");
}

#[test]
fn top_instance() {
    let (netlist, top, _) = reg4_netlist();
    let top_inst = netlist.top_cell_inst().unwrap();
    assert_eq!(netlist.top_cell(), Some(top));
    assert_eq!(netlist.cell_inst(top_inst).name(), "top");
    assert_eq!(netlist.cell_inst(top_inst).parent(), None);
    assert!(!netlist.cell(top).is_leaf());
}

#[test]
fn connect_rejects_foreign_net() {
    let (mut netlist, top, reg4) = reg4_netlist();
    let ff0 = netlist.cell_inst_named(reg4, "ff0").unwrap();
    let top_clk = netlist.net_named(top, "clk").unwrap();

    let err = netlist.connect_inst(top_clk, ff0, "CE", 0).unwrap_err();
    assert!(matches!(err, Error::ScopeMismatch { .. }));
}

#[test]
fn connect_rejects_top_instance() {
    let (mut netlist, top, _) = reg4_netlist();
    let top_inst = netlist.top_cell_inst().unwrap();
    let clk = netlist.port_named(top, "clk").unwrap();
    let port_inst = netlist.add_port_inst(Some(top_inst), clk, 0).unwrap();
    let top_clk = netlist.net_named(top, "clk").unwrap();

    assert_eq!(
        netlist.connect(top_clk, port_inst),
        Err(Error::TopInstanceConnection(port_inst))
    );
}

#[test]
fn connect_rejects_out_of_bounds_index() {
    let (mut netlist, _, reg4) = reg4_netlist();
    let net = netlist.add_net(reg4, "extra");
    let err = netlist.connect_boundary(net, "q", 4).unwrap_err();
    assert_eq!(
        err,
        Error::IndexOutOfBounds {
            port: "q[3:0]".into(),
            index: 4,
            width: 4,
        }
    );
}

#[test]
fn reconnect_moves_port_inst() {
    let (mut netlist, _, reg4) = reg4_netlist();
    let q0 = netlist.net_named(reg4, "q0").unwrap();
    let spare = netlist.add_net(reg4, "spare");
    let moved = netlist.net(q0).port_insts()[0];

    netlist.connect(spare, moved).unwrap();
    assert_eq!(netlist.port_inst(moved).net(), Some(spare));
    assert!(!netlist.net(q0).port_insts().contains(&moved));
    assert!(netlist.validate().is_empty());
}

#[test]
fn valid_netlist_has_no_issues() {
    let (netlist, _, _) = reg4_netlist();
    let issues = netlist.validate();
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
}

#[test]
fn duplicate_instance_names() {
    let (mut netlist, _, reg4) = reg4_netlist();
    let fdre = netlist.cell_named("FDRE").unwrap();
    netlist.add_cell_inst(reg4, "ff0", fdre);

    let issues = netlist.validate();
    assert!(issues.has_error());
    assert!(issues
        .iter()
        .any(|issue| matches!(issue.cause(), Cause::DuplicateInstanceNames { inst_name, .. } if inst_name == "ff0")));
}

#[test]
fn missing_top_is_a_warning() {
    let mut netlist = Netlist::new("empty");
    let lib = netlist.add_library("work");
    netlist.add_cell(lib, "lonely");

    let issues = netlist.validate();
    assert_eq!(issues.len(), 1);
    assert!(!issues.has_error());
}

#[test]
fn one_bit_bus_is_still_a_bus() {
    let mut netlist = Netlist::new("ports");
    let lib = netlist.add_library("work");
    let cell = netlist.add_cell(lib, "cell");
    let d = netlist.add_port(cell, "d[0:0]", Direction::Input).unwrap();
    let en = netlist.add_port(cell, "en", Direction::Input).unwrap();

    let d = netlist.port(d);
    assert_eq!(d.width(), 1);
    assert!(d.is_bus());
    assert_eq!(d.member_name(0), "d[0]");
    assert!(!netlist.port(en).is_bus());

    let top = netlist.add_cell(lib, "top");
    let u1 = netlist.add_cell_inst(top, "U1", cell);
    let net = netlist.add_net(top, "n");
    let pin = netlist.connect_inst(net, u1, "d", 0).unwrap();
    assert_eq!(netlist.port_inst_full_name(pin), "U1/d[0]");
}

#[test]
fn qualified_names_use_hier_sep() {
    let (netlist, _, reg4) = reg4_netlist();
    let ff1 = netlist.cell_inst_named(reg4, "ff1").unwrap();
    let q = netlist.cell_inst(ff1).port_insts()[2];
    assert_eq!(
        netlist.port_inst_full_name(q),
        format!("ff1{}Q", HIER_SEP)
    );
}

#[test]
fn duplicate_net_names() {
    let (mut netlist, _, reg4) = reg4_netlist();
    netlist.add_net(reg4, "clk");

    let issues = netlist.validate();
    assert_eq!(issues.len(), 1);
    assert!(issues.has_error());
    assert!(issues.iter().any(
        |issue| matches!(issue.cause(), Cause::DuplicateNetNames { net_name, cell_id, .. } if net_name == "clk" && *cell_id == reg4)
    ));
}

#[test]
fn out_of_bounds_index() {
    let (mut netlist, _, reg4) = reg4_netlist();
    let q0 = netlist.net_named(reg4, "q0").unwrap();
    let boundary = netlist.net(q0).port_insts()[1];
    netlist.port_insts.get_mut(&boundary).unwrap().index = 9;

    let issues = netlist.validate();
    assert_eq!(issues.len(), 1);
    assert!(matches!(
        issues.iter().next().unwrap().cause(),
        Cause::IndexOutOfBounds { port_inst, index: 9, width: 4, .. } if *port_inst == boundary
    ));
}

#[test]
fn scope_mismatch() {
    let (mut netlist, top, reg4) = reg4_netlist();
    let ff0 = netlist.cell_inst_named(reg4, "ff0").unwrap();
    let fdre = netlist.cell_named("FDRE").unwrap();
    let ce = netlist.port_named(fdre, "CE").unwrap();
    let pin = netlist.add_port_inst(Some(ff0), ce, 0).unwrap();

    let top_clk = netlist.net_named(top, "clk").unwrap();
    netlist.port_insts.get_mut(&pin).unwrap().net = Some(top_clk);
    netlist.nets.get_mut(&top_clk).unwrap().port_insts.push(pin);

    let issues = netlist.validate();
    assert_eq!(issues.len(), 1);
    assert!(matches!(
        issues.iter().next().unwrap().cause(),
        Cause::ScopeMismatch { port_inst, net, .. } if *port_inst == pin && *net == top_clk
    ));
}

#[test]
fn dangling_connection() {
    let (mut netlist, _, reg4) = reg4_netlist();
    let ff0 = netlist.cell_inst_named(reg4, "ff0").unwrap();
    let fdre = netlist.cell_named("FDRE").unwrap();
    let ce = netlist.port_named(fdre, "CE").unwrap();
    let unattached = netlist.add_port_inst(Some(ff0), ce, 0).unwrap();

    let clk = netlist.net_named(reg4, "clk").unwrap();
    netlist.nets.get_mut(&clk).unwrap().port_insts.push(unattached);

    let issues = netlist.validate();
    assert_eq!(issues.len(), 1);
    assert!(matches!(
        issues.iter().next().unwrap().cause(),
        Cause::DanglingConnection { port_inst, net } if *port_inst == unattached && *net == clk
    ));
}

#[test]
fn self_instantiation_is_recursive() {
    let mut netlist = Netlist::new("loop");
    let lib = netlist.add_library("work");
    let cell = netlist.add_cell(lib, "ouroboros");
    netlist.add_cell_inst(cell, "self_inst", cell);
    netlist.set_top_cell(cell);

    let issues = netlist.validate();
    assert_eq!(issues.len(), 1);
    assert!(matches!(
        issues.iter().next().unwrap().cause(),
        Cause::RecursiveHierarchy { cell_id, cell_name } if *cell_id == cell && cell_name == "ouroboros"
    ));
}

#[test]
fn indirect_recursion() {
    let (mut netlist, top, reg4) = reg4_netlist();
    netlist.add_cell_inst(reg4, "u_back", top);

    let issues = netlist.validate();
    assert!(issues.has_error());
    let recursive: Vec<_> = issues
        .iter()
        .filter_map(|issue| match issue.cause() {
            Cause::RecursiveHierarchy { cell_id, .. } => Some(*cell_id),
            _ => None,
        })
        .collect();
    assert_eq!(recursive.len(), 1);
    assert!(recursive[0] == top || recursive[0] == reg4);
}

#[test]
fn dangling_ids_are_reported() {
    let (mut netlist, _, reg4) = reg4_netlist();
    let mut missing_port = netlist.port_id;
    let missing_port = missing_port.alloc();
    let mut missing_net = netlist.net_id;
    let missing_net = missing_net.alloc();

    let ff0 = netlist.cell_inst_named(reg4, "ff0").unwrap();
    let d_pin = netlist.cell_inst(ff0).port_insts()[1];
    let q_pin = netlist.cell_inst(ff0).port_insts()[2];
    netlist.port_insts.get_mut(&d_pin).unwrap().port = missing_port;
    netlist.port_insts.get_mut(&q_pin).unwrap().net = Some(missing_net);

    let issues = netlist.validate();
    assert!(issues.has_error());
    assert!(issues.iter().any(|issue| matches!(
        issue.cause(),
        Cause::UnknownPort { port_inst, port } if *port_inst == d_pin && *port == missing_port
    )));
    assert!(issues.iter().any(|issue| matches!(
        issue.cause(),
        Cause::UnknownNet { net } if *net == missing_net
    )));
}

#[test]
#[should_panic]
fn foreign_id_panics() {
    let (netlist, _, _) = reg4_netlist();
    let mut other = Netlist::new("other");
    let lib = other.add_library("work");
    for i in 0..8 {
        other.add_cell(lib, format!("c{i}"));
    }
    let foreign = other.cell_named("c7").unwrap();
    netlist.cell(foreign);
}
