use crate::Node;

/// Render a snapshot as an indented outline, one node per line.
///
/// Elements show their `id` and every inline style in insertion order, which
/// makes the outline usable as a layout snapshot.
pub fn outline_from_dom(root: &Node, cap: usize) -> Vec<String> {
    fn walk(node: &Node, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        let indent = "  ".repeat(depth);
        match node {
            Node::Document { children, .. } => {
                out.push(format!("{indent}#document"));
                for c in children {
                    walk(c, depth + 1, out, left);
                }
            }
            Node::Element {
                name,
                children,
                style,
                ..
            } => {
                let mut line = format!("{indent}<{name}");
                if let Some(id) = node.attribute("id").filter(|id| !id.is_empty()) {
                    line.push_str(&format!(r#" id="{id}""#));
                }
                line.push('>');
                if !style.is_empty() {
                    let styl = style
                        .iter()
                        .map(|(k, v)| format!("{k}: {v};"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    line.push_str(&format!("  /* {styl} */"));
                }
                out.push(line);
                for c in children {
                    walk(c, depth + 1, out, left);
                }
            }
            Node::Text { text, .. } => {
                let t = text.replace('\n', " ").trim().to_string();
                if !t.is_empty() {
                    let show = if t.chars().count() > 40 {
                        format!("{}…", t.chars().take(40).collect::<String>())
                    } else {
                        t
                    };
                    out.push(format!("{indent}\"{show}\""));
                }
            }
        }
    }
    let mut out = Vec::new();
    let mut left = cap;
    walk(root, 0, &mut out, &mut left);
    out
}
