#[cfg(test)]
mod netlist_tests {
    use crate::cpu6502::node_names::{GND, VCC};
    use crate::netlist::{Netlist, NetlistError};
    use std::io::Cursor;

    fn netlist(trans: &str, segs: &str) -> Netlist {
        Netlist::from_readers(Cursor::new(trans), Cursor::new(segs)).unwrap()
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let list = netlist(
            "# transistor definitions\n\
             \n\
             0, 10, 11, 12\n\
             # another comment\n\
             1, 10, 13, 14\n",
            "# segment definitions\n\
             \n\
             10, 1\n",
        );

        assert_eq!(list.transistor_count(), 2);
        assert!(list.node(10).pull_up());
    }

    #[test]
    fn tokens_split_on_commas_and_whitespace() {
        let list = netlist("0 10,11\t12\n", "10 1\n");

        assert_eq!(list.transistor_count(), 1);
        assert_eq!(list.transistors[0].gate, 10);
        assert_eq!(list.transistors[0].c1, 11);
        assert_eq!(list.transistors[0].c2, 12);
    }

    #[test]
    fn malformed_fields_parse_as_zero() {
        // a non-numeric gate field falls back to node 0
        let list = netlist("0, xyz, 11, 12\n", "");

        assert_eq!(list.transistors[0].gate, 0);
        assert!(list.node(0).is_defined());
    }

    #[test]
    fn short_lines_are_skipped() {
        let list = netlist("0, 10, 11, 12\n1, 10\n", "10, 1\n20\n");

        assert_eq!(list.transistor_count(), 1);
        assert!(!list.node(20).is_defined());
    }

    #[test]
    fn first_segment_line_wins() {
        let list = netlist("0, 10, 11, 12\n", "10, 1, 4000, 4010\n10, 0\n");

        assert!(list.node(10).pull_up());
    }

    #[test]
    fn supplies_are_canonicalized_onto_c2() {
        let trans = format!("0, 10, {}, 11\n1, 10, {}, 12\n", GND, VCC);
        let list = netlist(&trans, "");

        assert_eq!(list.transistors[0].c1, 11);
        assert_eq!(list.transistors[0].c2, GND);
        assert_eq!(list.transistors[1].c1, 12);
        assert_eq!(list.transistors[1].c2, VCC);
    }

    #[test]
    fn nodes_referenced_only_by_transistors_are_allocated() {
        let list = netlist("0, 10, 11, 12\n", "");

        for &id in &[10, 11, 12] {
            let node = list.node(id);
            assert!(node.is_defined());
            assert!(!node.pull_up());
            assert_eq!(node.pull_down, -1);
        }
        assert!(!list.node(13).is_defined());
    }

    #[test]
    fn adjacency_lists_point_back_at_the_transistor() {
        let list = netlist("0, 10, 11, 12\n1, 10, 11, 13\n", "");

        assert_eq!(list.node(10).gates, vec![0, 1]);
        assert_eq!(list.node(11).channels, vec![0, 1]);
        assert_eq!(list.node(12).channels, vec![0]);
        assert_eq!(list.node(13).channels, vec![1]);
    }

    #[test]
    fn out_of_range_ids_are_skipped() {
        let list = netlist("0, 10, 11, 12\n1, 9999, 11, 12\n", "9999, 1\n");

        assert_eq!(list.transistor_count(), 1);
    }

    #[test]
    fn empty_transistor_file_is_an_error() {
        let result = Netlist::from_readers(Cursor::new("# nothing\n"), Cursor::new("10, 1\n"));

        assert!(matches!(result, Err(NetlistError::EmptyNetlist)));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let result = Netlist::from_files("no/such/transdefs.txt", "no/such/segdefs.txt");

        assert!(matches!(result, Err(NetlistError::FileError(_))));
    }
}
