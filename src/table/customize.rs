//! Column customizer: picks the visible columns for a render pass.

use tracing::warn;

use crate::model::{Header, NAMESPACE_COL};

/// Display inputs that decide column visibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnOptions<'a> {
    pub wide: bool,
    /// Ordered column names configured for the view.
    pub explicit: &'a [String],
    pub metrics: bool,
    /// Every namespace is shown at once.
    pub cluster_wide: bool,
}

/// Visible columns for one render pass.
///
/// `indices[i]` is the position in the source header of visible column `i`;
/// the renderer reads fields through it, so both sides agree on the mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPlan {
    pub header: Header,
    pub indices: Vec<usize>,
    /// Column count of the source header.
    pub source_len: usize,
}

impl ColumnPlan {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Derives the visible column plan for `header`.
pub fn customize(header: &Header, opts: ColumnOptions<'_>) -> ColumnPlan {
    let mut indices: Vec<usize> = if opts.explicit.is_empty() {
        header
            .iter()
            .enumerate()
            .filter(|(_, c)| opts.wide || !c.wide)
            .map(|(i, _)| i)
            .collect()
    } else {
        opts.explicit
            .iter()
            .filter_map(|name| {
                let idx = header.index_of(name, true);
                if idx.is_none() {
                    warn!(column = %name, "configured column not found in header");
                }
                idx
            })
            .collect()
    };

    indices.retain(|&i| {
        let Some(col) = header.get(i) else {
            return false;
        };
        if col.name == NAMESPACE_COL && !opts.cluster_wide {
            return false;
        }
        !(col.mx && !opts.metrics)
    });

    let columns = indices
        .iter()
        .filter_map(|&i| header.get(i).cloned())
        .collect();
    ColumnPlan {
        header: Header::new(columns),
        indices,
        source_len: header.len(),
    }
}
