use silica_hir::{
    DefinitionKind, Design, HierarchicalReference, Selector, SymbolId, SymbolInfo, SymbolKind,
    allowed_in_modport,
};

/// Retarget a hierarchical reference that begins at an interface port
/// onto a different instance with the same port: the same lookup,
/// performed against a structurally identical body.
///
/// Returns `None` when any step fails to resolve (unresolved name,
/// out-of-bounds select, non-scope symbol mid-path, unknown selector
/// shape); the caller drops the side effect silently.
pub(crate) fn retarget_iface_port(
    design: &Design<'_>,
    hier_ref: &HierarchicalReference<'_>,
    base: SymbolId,
) -> Option<SymbolId> {
    if !hier_ref.via_iface_port || hier_ref.target.is_none() {
        return None;
    }

    let SymbolInfo::Instance { body, .. } = &design.symbol(base).info else {
        return None;
    };

    // The port should always be found here unless some other error
    // occurred upstream.
    let path = hier_ref.path;
    let port_name = design.symbol(path[0].symbol).name.clone();
    let port = design.find_port(*body, &port_name)?;

    let mut symbol = Some(port);
    let mut modport: Option<SymbolId> = None;
    let mut instance_array_elems: Option<&[SymbolId]> = None;

    for step in &path[1..] {
        // Dereference chains of interface ports to their connections.
        while let Some(cur) = symbol
            && design.symbol(cur).kind() == SymbolKind::InterfacePort
        {
            symbol = match &design.symbol(cur).info {
                SymbolInfo::InterfacePort {
                    connection: Some((conn, mp)),
                    ..
                } => {
                    modport = *mp;
                    Some(*conn)
                }
                _ => None,
            };
        }
        let mut cur = symbol?;

        // `instance_array_elems` is set when the prior step range-selected
        // an interface instance array; the selected span has no symbol of
        // its own, so it is carried separately.
        if instance_array_elems.is_none() {
            match &design.symbol(cur).info {
                SymbolInfo::Instance { body, .. } => {
                    let body = *body;
                    // Modules can't be instantiated in interfaces.
                    let SymbolInfo::InstanceBody { definition_kind } = &design.symbol(body).info
                    else {
                        return None;
                    };
                    if *definition_kind == DefinitionKind::Module {
                        return None;
                    }
                    cur = body;

                    if let Some(mp) = modport.take() {
                        let mp_name = design.symbol(mp).name.clone();
                        cur = design.find_member(body, &mp_name)?;
                    }
                }
                SymbolInfo::InstanceArray { elements } => {
                    instance_array_elems = Some(elements);
                }
                _ => {
                    if !design.is_scope(cur) {
                        return None;
                    }
                }
            }
        }

        match &step.selector {
            Some(Selector::Index(index)) => {
                if let Some(elems) = instance_array_elems {
                    // Prior step was a range select; pick within it.
                    if *index < 0 || *index as usize >= elems.len() {
                        return None;
                    }
                    cur = elems[*index as usize];
                } else if let SymbolInfo::GenerateBlockArray { entries, valid } =
                    &design.symbol(cur).info
                {
                    if !*valid || *index < 0 || *index as usize >= entries.len() {
                        return None;
                    }
                    cur = entries[*index as usize];
                } else {
                    return None;
                }
            }
            Some(Selector::Range(first, second)) => {
                let Some(elems) = instance_array_elems else {
                    return None;
                };
                if *first < 0 || *second < 0 {
                    return None;
                }
                let (first, second) = (*first as usize, *second as usize);
                if first >= elems.len() || second >= elems.len() || second < first {
                    return None;
                }

                // Keep the narrowed span for the next step.
                instance_array_elems = Some(&elems[first..=second]);
                symbol = Some(cur);
                continue;
            }
            Some(Selector::Name(name)) => {
                let mut next = design.find_member(cur, name);
                if next.is_none() && design.symbol(cur).kind() == SymbolKind::Modport {
                    // A lookup inside a modport falls through to the
                    // parent scope only for kinds a modport could not
                    // itself contain.
                    let parent = design.symbol(cur).parent?;
                    next = design.find_member(parent, name);
                    match next {
                        Some(n)
                            if !allowed_in_modport(design.symbol(n).kind())
                                && design.symbol(n).kind() != SymbolKind::Modport => {}
                        _ => return None,
                    }
                }
                cur = next?;
            }
            None => return None,
        }

        symbol = Some(cur);
        instance_array_elems = None;
    }

    symbol
}
