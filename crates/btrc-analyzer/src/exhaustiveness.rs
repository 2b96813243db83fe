//! Exhaustive-return analysis.
//!
//! Decides whether every path through a block reaches a `return` or
//! `throw`. A block has-return when it contains a terminal statement, an
//! if/else chain whose arms all have-return, a `while (true)` whose body
//! has-return, a switch whose every case body has-return, or a try/catch
//! where both the try and catch bodies have-return. Loops with
//! non-literal-true conditions and `if` without `else` never count.

use btrc_parser::ast::{Block, ElseBranch, ExprKind, IfStmt, Stmt, StmtKind};

/// Whether every path through the block returns or throws.
pub fn block_has_return(block: &Block) -> bool {
    stmts_have_return(&block.statements)
}

fn stmts_have_return(stmts: &[Stmt]) -> bool {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Return(_) | StmtKind::Throw(_) => return true,
            StmtKind::If(if_stmt) => {
                if if_stmt.else_branch.is_some() && if_has_return(if_stmt) {
                    return true;
                }
            }
            StmtKind::Switch(switch) => {
                if !switch.cases.is_empty()
                    && switch.cases.iter().all(|case| stmts_have_return(&case.body))
                {
                    return true;
                }
            }
            StmtKind::While { condition, body } => {
                // An infinite loop that always returns counts.
                if matches!(condition.kind, ExprKind::BoolLit { value: true })
                    && block_has_return(body)
                {
                    return true;
                }
            }
            StmtKind::TryCatch(tc) => {
                if block_has_return(&tc.try_block) && block_has_return(&tc.catch_block) {
                    return true;
                }
            }
            StmtKind::Block(inner) => {
                if block_has_return(inner) {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Whether ALL branches of an if/else chain return.
fn if_has_return(if_stmt: &IfStmt) -> bool {
    if !block_has_return(&if_stmt.then_block) {
        return false;
    }
    match &if_stmt.else_branch {
        Some(ElseBranch::Else(block)) => block_has_return(block),
        Some(ElseBranch::ElseIf(stmt)) => match &stmt.kind {
            StmtKind::If(nested) => nested.else_branch.is_some() && if_has_return(nested),
            _ => false,
        },
        None => false,
    }
}
