use std::collections::HashSet;

use super::*;

// An id wins outright, the body anchors the path, everything else is
// positioned among same-tag siblings only. Tag names render uppercase the
// way `tagName` reports them.
pub(crate) fn xpath_to(dom: &Dom, node_id: NodeId) -> String {
    if let Some(id) = dom.attr(node_id, "id") {
        if !id.is_empty() {
            return format!("//*[@id='{id}']");
        }
    }

    let tag = dom
        .tag_name(node_id)
        .unwrap_or_default()
        .to_ascii_uppercase();

    if tag.eq_ignore_ascii_case("body") {
        return format!("//{tag}");
    }

    let Some(parent) = dom.parent(node_id) else {
        return format!("//{tag}");
    };
    if dom.element(parent).is_none() {
        return format!("//{tag}");
    }

    let position = same_tag_position(dom, node_id);
    format!("{}/{}[{}]", xpath_to(dom, parent), tag, position)
}

// 1-based position among element siblings sharing this node's tag name.
pub(crate) fn same_tag_position(dom: &Dom, node_id: NodeId) -> usize {
    let Some(parent) = dom.parent(node_id) else {
        return 1;
    };
    let Some(tag) = dom.tag_name(node_id).map(str::to_string) else {
        return 1;
    };

    let mut ix = 0usize;
    for child in &dom.nodes[parent.0].children {
        if dom
            .tag_name(*child)
            .is_some_and(|name| name.eq_ignore_ascii_case(&tag))
        {
            ix += 1;
        }
        if *child == node_id {
            break;
        }
    }
    ix.max(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum XpathAxis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum XpathPredicate {
    Position(usize),
    IdEquals(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct XpathStep {
    axis: XpathAxis,
    // None is the `*` node test.
    tag: Option<String>,
    predicate: Option<XpathPredicate>,
}

pub(crate) fn evaluate_xpath(dom: &Dom, expr: &str) -> Result<Vec<NodeId>> {
    let steps = parse_xpath(expr)?;

    if let [step] = steps.as_slice() {
        if step.axis == XpathAxis::Descendant && step.tag.is_none() {
            if let Some(XpathPredicate::IdEquals(id)) = &step.predicate {
                return Ok(dom.by_id(id).into_iter().collect());
            }
        }
    }

    let mut context = vec![dom.root];
    for step in &steps {
        let mut seen = HashSet::new();
        let mut next = Vec::new();
        for node in context {
            let mut candidates = Vec::new();
            match step.axis {
                XpathAxis::Descendant => {
                    dom.collect_elements_descendants_dfs(node, &mut candidates);
                }
                XpathAxis::Child => {
                    for child in &dom.nodes[node.0].children {
                        if dom.element(*child).is_some() {
                            candidates.push(*child);
                        }
                    }
                }
            }
            for candidate in candidates {
                if !matches_step(dom, candidate, step) {
                    continue;
                }
                if seen.insert(candidate) {
                    next.push(candidate);
                }
            }
        }
        context = next;
    }

    // Arena ids are assigned in parse order, so ascending id is document order.
    context.sort_by_key(|node| node.0);
    Ok(context)
}

fn matches_step(dom: &Dom, node_id: NodeId, step: &XpathStep) -> bool {
    if let Some(tag) = &step.tag {
        if !dom
            .tag_name(node_id)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
        {
            return false;
        }
    }

    match &step.predicate {
        None => true,
        Some(XpathPredicate::Position(n)) => same_tag_position(dom, node_id) == *n,
        Some(XpathPredicate::IdEquals(id)) => {
            dom.attr(node_id, "id").as_deref() == Some(id.as_str())
        }
    }
}

fn parse_xpath(expr: &str) -> Result<Vec<XpathStep>> {
    let src = expr.trim();
    let bytes = src.as_bytes();
    if bytes.first() != Some(&b'/') {
        return Err(Error::XpathParse(expr.to_string()));
    }

    let mut steps = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let axis = if bytes.get(i) == Some(&b'/') && bytes.get(i + 1) == Some(&b'/') {
            i += 2;
            XpathAxis::Descendant
        } else if bytes.get(i) == Some(&b'/') {
            i += 1;
            XpathAxis::Child
        } else {
            return Err(Error::XpathParse(expr.to_string()));
        };

        let tag = if bytes.get(i) == Some(&b'*') {
            i += 1;
            None
        } else {
            let start = i;
            while i < bytes.len() && is_xpath_name_char(bytes[i]) {
                i += 1;
            }
            if i == start {
                return Err(Error::XpathParse(expr.to_string()));
            }
            Some(
                src.get(start..i)
                    .ok_or_else(|| Error::XpathParse(expr.to_string()))?
                    .to_string(),
            )
        };

        let predicate = if bytes.get(i) == Some(&b'[') {
            let (predicate, next) = parse_xpath_predicate(src, i)?;
            i = next;
            Some(predicate)
        } else {
            None
        };

        if tag.is_none() && !matches!(predicate, Some(XpathPredicate::IdEquals(_))) {
            return Err(Error::XpathParse(expr.to_string()));
        }

        steps.push(XpathStep {
            axis,
            tag,
            predicate,
        });
    }

    if steps.is_empty() {
        return Err(Error::XpathParse(expr.to_string()));
    }
    Ok(steps)
}

fn parse_xpath_predicate(src: &str, start: usize) -> Result<(XpathPredicate, usize)> {
    let bytes = src.as_bytes();
    if bytes.get(start) != Some(&b'[') {
        return Err(Error::XpathParse(src.to_string()));
    }

    let mut i = start + 1;
    let body_start = i;
    while i < bytes.len() && bytes[i] != b']' {
        i += 1;
    }
    if i >= bytes.len() {
        return Err(Error::XpathParse(src.to_string()));
    }
    let body = src
        .get(body_start..i)
        .ok_or_else(|| Error::XpathParse(src.to_string()))?
        .trim();
    let end = i + 1;

    if let Ok(position) = body.parse::<usize>() {
        if position == 0 {
            return Err(Error::XpathParse(src.to_string()));
        }
        return Ok((XpathPredicate::Position(position), end));
    }

    let Some(rest) = body.strip_prefix("@id") else {
        return Err(Error::XpathParse(src.to_string()));
    };
    let rest = rest.trim_start();
    let Some(rest) = rest.strip_prefix('=') else {
        return Err(Error::XpathParse(src.to_string()));
    };
    let rest = rest.trim();
    let quoted = rest
        .strip_prefix('\'')
        .and_then(|r| r.strip_suffix('\''))
        .or_else(|| rest.strip_prefix('"').and_then(|r| r.strip_suffix('"')))
        .ok_or_else(|| Error::XpathParse(src.to_string()))?;

    Ok((XpathPredicate::IdEquals(quoted.to_string()), end))
}

fn is_xpath_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}
