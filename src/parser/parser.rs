//! Parser implementation
//!
//! This module implements the recursive-descent parser for the Think
//! language. One token of lookahead is sufficient for the grammar.

use super::ast::*;
use crate::error::{SourceLocation, ThinkError, ThinkResult};
use crate::lexer::{Keyword, Literal as TokenLiteral, Token, TokenType};

/// Parser for Think source code
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    /// Create a new parser from tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse tokens into a Program
    pub fn parse(&mut self) -> ThinkResult<Program> {
        let mut objectives = Vec::new();
        let mut tasks = Vec::new();
        let mut runs = Vec::new();

        // Leading objective declarations. All of them are collected;
        // the validator reports missing or duplicate objectives.
        while self.match_keyword(Keyword::Objective) {
            objectives.push(self.objective_declaration()?);
        }

        while !self.is_at_end() {
            if self.match_keyword(Keyword::Task) {
                tasks.push(self.task_declaration()?);
            } else if self.match_keyword(Keyword::Run) {
                runs.push(self.run_statement()?);
            } else if self.check_keyword(Keyword::Objective) {
                return Err(ThinkError::parse_error(
                    "'objective' must appear before any task or run statement",
                    self.peek().location.clone(),
                ));
            } else {
                return Err(ThinkError::parse_error(
                    format!("Expected 'task' or 'run', found {}", self.peek().token_type),
                    self.peek().location.clone(),
                ));
            }
        }

        Ok(Program {
            objectives,
            tasks,
            runs,
        })
    }

    // ===== Declarations =====

    fn objective_declaration(&mut self) -> ThinkResult<Objective> {
        let location = self.previous().location.clone();
        let text = self.consume_string("Expected a quoted objective description")?;
        Ok(Objective { text, location })
    }

    fn task_declaration(&mut self) -> ThinkResult<Task> {
        let location = self.previous().location.clone();
        let name = self.consume_string("Expected a quoted task name after 'task'")?;
        self.consume(TokenType::Colon, "Expected ':' after task name")?;

        let mut members = Vec::new();
        loop {
            if self.match_keyword(Keyword::Step) {
                members.push(TaskMember::Step(self.step_declaration()?));
            } else if self.match_keyword(Keyword::Subtask) {
                members.push(TaskMember::Subtask(self.subtask_declaration()?));
            } else {
                break;
            }
        }

        if members.is_empty() {
            return Err(ThinkError::parse_error(
                "Expected at least one 'step' or 'subtask' in task body",
                self.peek().location.clone(),
            ));
        }

        Ok(Task {
            name,
            members,
            location,
        })
    }

    fn step_declaration(&mut self) -> ThinkResult<Step> {
        let location = self.previous().location.clone();
        let name = self.consume_string("Expected a quoted step name after 'step'")?;
        self.consume(TokenType::Colon, "Expected ':' after step name")?;
        let body = self.statement_list()?;
        Ok(Step {
            name,
            body,
            location,
        })
    }

    fn subtask_declaration(&mut self) -> ThinkResult<Subtask> {
        let location = self.previous().location.clone();
        let name = self.consume_string("Expected a quoted subtask name after 'subtask'")?;
        self.consume(TokenType::Colon, "Expected ':' after subtask name")?;
        let body = self.statement_list()?;
        Ok(Subtask {
            name,
            body,
            location,
        })
    }

    fn run_statement(&mut self) -> ThinkResult<RunStmt> {
        let location = self.previous().location.clone();
        let task = self.consume_string("Expected a quoted task name after 'run'")?;
        Ok(RunStmt { task, location })
    }

    // ===== Statements =====

    /// Parse statements until a block boundary keyword or EOF
    fn statement_list(&mut self) -> ThinkResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.at_block_boundary() {
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    fn at_block_boundary(&self) -> bool {
        if self.is_at_end() {
            return true;
        }
        matches!(
            &self.peek().token_type,
            TokenType::Keyword(
                Keyword::Step
                    | Keyword::Subtask
                    | Keyword::Task
                    | Keyword::Run
                    | Keyword::Objective
                    | Keyword::End
                    | Keyword::Elif
                    | Keyword::Else
            )
        )
    }

    fn statement(&mut self) -> ThinkResult<Stmt> {
        if self.match_keyword(Keyword::Decide) {
            self.decide_statement()
        } else if self.match_keyword(Keyword::For) {
            self.for_statement()
        } else if self.match_keyword(Keyword::While) {
            self.while_statement()
        } else if self.match_keyword(Keyword::Return) {
            self.return_statement()
        } else if self.check(TokenType::Identifier)
            && self.peek_next().map(|t| &t.token_type) == Some(&TokenType::Assign)
        {
            self.assignment()
        } else {
            self.expression_statement()
        }
    }

    fn assignment(&mut self) -> ThinkResult<Stmt> {
        let target = self.consume_identifier("Expected variable name")?;
        let location = self.previous().location.clone();
        self.consume(TokenType::Assign, "Expected '=' in assignment")?;
        let value = self.expression()?;
        Ok(Stmt::Assignment {
            target,
            value,
            location,
        })
    }

    fn decide_statement(&mut self) -> ThinkResult<Stmt> {
        let location = self.previous().location.clone();
        self.consume(TokenType::Colon, "Expected ':' after 'decide'")?;

        self.consume_keyword(Keyword::If, "Expected 'if' to open a decide block")?;
        let mut branches = vec![self.decide_branch()?];
        let mut else_body = None;

        loop {
            if self.match_keyword(Keyword::Elif) {
                branches.push(self.decide_branch()?);
            } else if self.match_keyword(Keyword::Else) {
                if self.match_keyword(Keyword::If) {
                    // 'else if' is accepted as a spelling of 'elif'
                    branches.push(self.decide_branch()?);
                } else {
                    self.consume(TokenType::Colon, "Expected ':' after 'else'")?;
                    else_body = Some(self.statement_list()?);
                    break;
                }
            } else {
                break;
            }
        }

        self.consume_keyword(Keyword::End, "Expected 'end' to close 'decide' block")?;

        Ok(Stmt::Decide {
            branches,
            else_body,
            location,
        })
    }

    fn decide_branch(&mut self) -> ThinkResult<DecideBranch> {
        let location = self.previous().location.clone();
        let condition = self.expression()?;
        self.consume_keyword(Keyword::Then, "Expected 'then' after condition")?;
        self.consume(TokenType::Colon, "Expected ':' after 'then'")?;
        let body = self.statement_list()?;
        Ok(DecideBranch {
            condition,
            body,
            location,
        })
    }

    fn for_statement(&mut self) -> ThinkResult<Stmt> {
        let location = self.previous().location.clone();

        let first = self.consume_identifier("Expected loop variable after 'for'")?;
        let binding = if self.match_token(TokenType::Comma) {
            let second = self.consume_identifier("Expected second loop variable after ','")?;
            LoopBinding::Pair(first, second)
        } else {
            LoopBinding::Single(first)
        };

        self.consume_keyword(Keyword::In, "Expected 'in' after loop variable")?;

        let iterable = if self.match_keyword(Keyword::Range) {
            self.consume(TokenType::LeftParen, "Expected '(' after 'range'")?;
            let first_arg = self.expression()?;
            let iterable = if self.match_token(TokenType::Comma) {
                let end = self.expression()?;
                ForIterable::Range {
                    start: Some(Box::new(first_arg)),
                    end: Box::new(end),
                }
            } else {
                ForIterable::Range {
                    start: None,
                    end: Box::new(first_arg),
                }
            };
            self.consume(TokenType::RightParen, "Expected ')' after range arguments")?;
            iterable
        } else if self.match_keyword(Keyword::Enumerate) {
            self.consume(TokenType::LeftParen, "Expected '(' after 'enumerate'")?;
            let expr = self.expression()?;
            self.consume(TokenType::RightParen, "Expected ')' after enumerate argument")?;
            ForIterable::Enumerate(expr)
        } else {
            ForIterable::Sequence(self.expression()?)
        };

        // The two-variable binding exists for enumerate's (index, value) pairs
        match (&binding, &iterable) {
            (LoopBinding::Pair(..), ForIterable::Enumerate(_)) => {}
            (LoopBinding::Pair(..), _) => {
                return Err(ThinkError::parse_error(
                    "Two loop variables are only valid with 'enumerate'",
                    location,
                ));
            }
            (LoopBinding::Single(_), ForIterable::Enumerate(_)) => {
                return Err(ThinkError::parse_error(
                    "'enumerate' requires two loop variables: for index, value in enumerate(...)",
                    location,
                ));
            }
            _ => {}
        }

        self.consume(TokenType::Colon, "Expected ':' after for-loop header")?;
        let body = self.statement_list()?;
        self.consume_keyword(Keyword::End, "Expected 'end' to close 'for' loop")?;

        Ok(Stmt::For {
            binding,
            iterable,
            body,
            location,
        })
    }

    fn while_statement(&mut self) -> ThinkResult<Stmt> {
        let location = self.previous().location.clone();
        let condition = self.expression()?;
        self.consume(TokenType::Colon, "Expected ':' after while condition")?;
        let body = self.statement_list()?;
        self.consume_keyword(Keyword::End, "Expected 'end' to close 'while' loop")?;

        Ok(Stmt::While {
            condition,
            body,
            location,
        })
    }

    fn return_statement(&mut self) -> ThinkResult<Stmt> {
        let location = self.previous().location.clone();
        let value = if self.starts_expression() {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Stmt::Return { value, location })
    }

    fn expression_statement(&mut self) -> ThinkResult<Stmt> {
        let location = self.peek().location.clone();
        let expr = self.expression()?;
        Ok(Stmt::Expression { expr, location })
    }

    /// Whether the current token can begin an expression
    fn starts_expression(&self) -> bool {
        match &self.peek().token_type {
            TokenType::Literal(_)
            | TokenType::Identifier
            | TokenType::LeftParen
            | TokenType::LeftBracket
            | TokenType::LeftBrace
            | TokenType::Minus => true,
            TokenType::Keyword(
                Keyword::True | Keyword::False | Keyword::Not | Keyword::Range | Keyword::Enumerate,
            ) => true,
            _ => false,
        }
    }

    // ===== Expressions =====

    fn expression(&mut self) -> ThinkResult<Expr> {
        self.logical_or()
    }

    fn logical_or(&mut self) -> ThinkResult<Expr> {
        let mut expr = self.logical_and()?;

        while self.match_keyword(Keyword::Or) {
            let location = self.previous().location.clone();
            let right = Box::new(self.logical_and()?);
            expr = Expr::Logical {
                left: Box::new(expr),
                operator: LogicalOp::Or,
                right,
                location,
            };
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> ThinkResult<Expr> {
        let mut expr = self.equality()?;

        while self.match_keyword(Keyword::And) {
            let location = self.previous().location.clone();
            let right = Box::new(self.equality()?);
            expr = Expr::Logical {
                left: Box::new(expr),
                operator: LogicalOp::And,
                right,
                location,
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ThinkResult<Expr> {
        let mut expr = self.comparison()?;

        while self.match_tokens(&[TokenType::Equal, TokenType::NotEqual]) {
            let location = self.previous().location.clone();
            let operator = match &self.previous().token_type {
                TokenType::Equal => BinaryOp::Equal,
                TokenType::NotEqual => BinaryOp::NotEqual,
                _ => unreachable!(),
            };
            let right = Box::new(self.comparison()?);
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right,
                location,
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ThinkResult<Expr> {
        let mut expr = self.term()?;

        while self.match_tokens(&[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ]) {
            let location = self.previous().location.clone();
            let operator = match &self.previous().token_type {
                TokenType::Greater => BinaryOp::Greater,
                TokenType::GreaterEqual => BinaryOp::GreaterEqual,
                TokenType::Less => BinaryOp::Less,
                TokenType::LessEqual => BinaryOp::LessEqual,
                _ => unreachable!(),
            };
            let right = Box::new(self.term()?);
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right,
                location,
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> ThinkResult<Expr> {
        let mut expr = self.factor()?;

        while self.match_tokens(&[TokenType::Plus, TokenType::Minus]) {
            let location = self.previous().location.clone();
            let operator = match &self.previous().token_type {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Subtract,
                _ => unreachable!(),
            };
            let right = Box::new(self.factor()?);
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right,
                location,
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ThinkResult<Expr> {
        let mut expr = self.unary()?;

        while self.match_tokens(&[TokenType::Star, TokenType::Slash]) {
            let location = self.previous().location.clone();
            let operator = match &self.previous().token_type {
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Slash => BinaryOp::Divide,
                _ => unreachable!(),
            };
            let right = Box::new(self.unary()?);
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right,
                location,
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ThinkResult<Expr> {
        if self.match_token(TokenType::Minus) || self.match_keyword(Keyword::Not) {
            let location = self.previous().location.clone();
            let operator = match &self.previous().token_type {
                TokenType::Minus => UnaryOp::Negate,
                TokenType::Keyword(Keyword::Not) => UnaryOp::Not,
                _ => unreachable!(),
            };
            let operand = Box::new(self.unary()?);
            return Ok(Expr::Unary {
                operator,
                operand,
                location,
            });
        }

        self.postfix()
    }

    fn postfix(&mut self) -> ThinkResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.match_token(TokenType::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if self.match_token(TokenType::LeftBracket) {
                let location = self.previous().location.clone();
                let index = Box::new(self.expression()?);
                self.consume(TokenType::RightBracket, "Expected ']' after index")?;
                expr = Expr::Index {
                    base: Box::new(expr),
                    index,
                    location,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ThinkResult<Expr> {
        let location = self.previous().location.clone();

        let name = match callee {
            Expr::Variable { name, .. } => name,
            other => {
                return Err(ThinkError::parse_error(
                    "Only named functions and subtasks can be called",
                    other.location().clone(),
                ));
            }
        };

        let mut arguments = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                arguments.push(self.expression()?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenType::RightParen, "Expected ')' after arguments")?;

        Ok(Expr::Call {
            name,
            arguments,
            location,
        })
    }

    fn primary(&mut self) -> ThinkResult<Expr> {
        let location = self.peek().location.clone();

        // Literals
        if let TokenType::Literal(lit) = &self.peek().token_type {
            let value = match lit {
                TokenLiteral::Integer(n) => Literal::Integer(*n),
                TokenLiteral::Float(f) => Literal::Float(*f),
                TokenLiteral::String(s) => Literal::String(s.clone()),
            };
            self.advance();
            return Ok(Expr::Literal { value, location });
        }

        // Boolean literals
        if self.match_keyword(Keyword::True) {
            return Ok(Expr::Literal {
                value: Literal::Boolean(true),
                location,
            });
        }

        if self.match_keyword(Keyword::False) {
            return Ok(Expr::Literal {
                value: Literal::Boolean(false),
                location,
            });
        }

        // range/enumerate in expression position parse like named calls
        if self.match_keyword(Keyword::Range) {
            return Ok(Expr::Variable {
                name: "range".to_string(),
                location,
            });
        }

        if self.match_keyword(Keyword::Enumerate) {
            return Ok(Expr::Variable {
                name: "enumerate".to_string(),
                location,
            });
        }

        // Identifiers
        if self.check(TokenType::Identifier) {
            let name = self.advance().lexeme.clone();
            return Ok(Expr::Variable { name, location });
        }

        // Parenthesized expression
        if self.match_token(TokenType::LeftParen) {
            let expr = self.expression()?;
            self.consume(TokenType::RightParen, "Expected ')' after expression")?;
            return Ok(expr);
        }

        // List literal
        if self.match_token(TokenType::LeftBracket) {
            return self.list_literal(location);
        }

        // Dict literal
        if self.match_token(TokenType::LeftBrace) {
            return self.dict_literal(location);
        }

        Err(ThinkError::parse_error(
            format!("Expected expression, found {}", self.peek().token_type),
            self.peek().location.clone(),
        ))
    }

    fn list_literal(&mut self, location: SourceLocation) -> ThinkResult<Expr> {
        let mut items = Vec::new();

        if !self.check(TokenType::RightBracket) {
            loop {
                items.push(self.expression()?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenType::RightBracket, "Expected ']' after list items")?;

        Ok(Expr::List { items, location })
    }

    fn dict_literal(&mut self, location: SourceLocation) -> ThinkResult<Expr> {
        let mut entries = Vec::new();

        if !self.check(TokenType::RightBrace) {
            loop {
                let key = self.expression()?;
                self.consume(TokenType::Colon, "Expected ':' after dict key")?;
                let value = self.expression()?;
                entries.push((key, value));
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }

        self.consume(TokenType::RightBrace, "Expected '}' after dict entries")?;

        Ok(Expr::Dict { entries, location })
    }

    // ===== Helper Methods =====

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_tokens(&mut self, types: &[TokenType]) -> bool {
        for t in types {
            if self.check(t.clone()) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            std::mem::discriminant(&self.peek().token_type) == std::mem::discriminant(&token_type)
        }
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        if self.is_at_end() {
            false
        } else {
            matches!(&self.peek().token_type, TokenType::Keyword(k) if k == &keyword)
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.current + 1)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> ThinkResult<&Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(ThinkError::parse_error(
                message,
                self.peek().location.clone(),
            ))
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword, message: &str) -> ThinkResult<&Token> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(ThinkError::parse_error(
                message,
                self.peek().location.clone(),
            ))
        }
    }

    fn consume_identifier(&mut self, message: &str) -> ThinkResult<String> {
        if self.check(TokenType::Identifier) {
            Ok(self.advance().lexeme.clone())
        } else {
            Err(ThinkError::parse_error(
                message,
                self.peek().location.clone(),
            ))
        }
    }

    fn consume_string(&mut self, message: &str) -> ThinkResult<String> {
        if let TokenType::Literal(TokenLiteral::String(s)) = &self.peek().token_type {
            let s = s.clone();
            self.advance();
            Ok(s)
        } else {
            Err(ThinkError::parse_error(
                message,
                self.peek().location.clone(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_source(source: &str) -> ThinkResult<Program> {
        let tokens = Lexer::new(source, None).tokenize()?;
        Parser::new(tokens).parse()
    }

    fn parse_ok(source: &str) -> Program {
        parse_source(source).expect("program should parse")
    }

    #[test]
    fn test_minimal_program() {
        let program = parse_ok(
            r#"
            objective "Calculate student grades"

            task "Process Grades":
                step "Collect":
                    scores = [85, 92, 78]

            run "Process Grades"
            "#,
        );

        assert_eq!(program.objective(), Some("Calculate student grades"));
        assert_eq!(program.tasks.len(), 1);
        assert_eq!(program.tasks[0].name, "Process Grades");
        assert_eq!(program.tasks[0].members.len(), 1);
        assert_eq!(program.runs.len(), 1);
        assert_eq!(program.runs[0].task, "Process Grades");
    }

    #[test]
    fn test_steps_and_subtasks_interleave() {
        let program = parse_ok(
            r#"
            objective "Test"
            task "Mixed":
                step "One":
                    x = 1
                subtask "Helper":
                    return x
                step "Two":
                    y = helper()
            run "Mixed"
            "#,
        );

        let members = &program.tasks[0].members;
        assert_eq!(members.len(), 3);
        assert!(matches!(members[0], TaskMember::Step(_)));
        assert!(matches!(members[1], TaskMember::Subtask(_)));
        assert!(matches!(members[2], TaskMember::Step(_)));
    }

    #[test]
    fn test_objective_after_task_is_parse_error() {
        let result = parse_source(
            r#"
            task "First":
                step "S":
                    x = 1
            objective "Too late"
            "#,
        );

        let err = result.unwrap_err();
        assert!(matches!(err, ThinkError::ParseError { .. }));
        assert!(err.message().contains("before any task"));
    }

    #[test]
    fn test_missing_objective_still_parses() {
        // Objective-count defects belong to the validator
        let program = parse_ok(
            r#"
            task "T":
                step "S":
                    x = 1
            run "T"
            "#,
        );
        assert!(program.objectives.is_empty());
    }

    #[test]
    fn test_decide_with_elif_and_else() {
        let program = parse_ok(
            r#"
            objective "Test"
            task "Logic":
                step "Check":
                    decide:
                        if x > 0 then:
                            sign = 1
                        elif x == 0 then:
                            sign = 0
                        else:
                            sign = -1
                    end
            run "Logic"
            "#,
        );

        let TaskMember::Step(step) = &program.tasks[0].members[0] else {
            panic!("expected step");
        };
        let Stmt::Decide {
            branches,
            else_body,
            ..
        } = &step.body[0]
        else {
            panic!("expected decide");
        };
        assert_eq!(branches.len(), 2);
        assert!(else_body.is_some());
    }

    #[test]
    fn test_else_if_spelling() {
        let program = parse_ok(
            r#"
            objective "Test"
            task "Logic":
                step "Check":
                    decide:
                        if x > 100 then:
                            band = 3
                        else if x > 10 then:
                            band = 2
                        else:
                            band = 1
                    end
            run "Logic"
            "#,
        );

        let TaskMember::Step(step) = &program.tasks[0].members[0] else {
            panic!("expected step");
        };
        let Stmt::Decide { branches, .. } = &step.body[0] else {
            panic!("expected decide");
        };
        assert_eq!(branches.len(), 2);
    }

    #[test]
    fn test_decide_missing_end_is_parse_error() {
        let result = parse_source(
            r#"
            objective "Test"
            task "Logic":
                step "Check":
                    decide:
                        if x > 0 then:
                            sign = 1
            run "Logic"
            "#,
        );

        let err = result.unwrap_err();
        assert!(err.message().contains("'end'"));
    }

    #[test]
    fn test_for_loop_forms() {
        let program = parse_ok(
            r#"
            objective "Test"
            task "Loops":
                step "All":
                    for item in items:
                        total = total + item
                    end
                    for i in range(10):
                        x = i
                    end
                    for i in range(2, 8):
                        x = i
                    end
                    for index, value in enumerate(items):
                        x = index + value
                    end
            run "Loops"
            "#,
        );

        let TaskMember::Step(step) = &program.tasks[0].members[0] else {
            panic!("expected step");
        };
        assert_eq!(step.body.len(), 4);
        assert!(matches!(
            &step.body[0],
            Stmt::For {
                iterable: ForIterable::Sequence(_),
                ..
            }
        ));
        assert!(matches!(
            &step.body[1],
            Stmt::For {
                iterable: ForIterable::Range { start: None, .. },
                ..
            }
        ));
        assert!(matches!(
            &step.body[2],
            Stmt::For {
                iterable: ForIterable::Range { start: Some(_), .. },
                ..
            }
        ));
        assert!(matches!(
            &step.body[3],
            Stmt::For {
                binding: LoopBinding::Pair(..),
                iterable: ForIterable::Enumerate(_),
                ..
            }
        ));
    }

    #[test]
    fn test_for_missing_end_is_parse_error() {
        let result = parse_source(
            r#"
            objective "Test"
            task "Loops":
                step "Broken":
                    for item in items:
                        total = total + item
            run "Loops"
            "#,
        );

        let err = result.unwrap_err();
        assert!(err.message().contains("'end'"));
    }

    #[test]
    fn test_pair_binding_without_enumerate_is_parse_error() {
        let result = parse_source(
            r#"
            objective "Test"
            task "Loops":
                step "Broken":
                    for a, b in items:
                        x = a
                    end
            run "Loops"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_enumerate_requires_pair_binding() {
        let result = parse_source(
            r#"
            objective "Test"
            task "Loops":
                step "Broken":
                    for a in enumerate(items):
                        x = a
                    end
            run "Loops"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_while_loop() {
        let program = parse_ok(
            r#"
            objective "Test"
            task "Countdown":
                step "Loop":
                    n = 3
                    while n > 0:
                        n = n - 1
                    end
            run "Countdown"
            "#,
        );

        let TaskMember::Step(step) = &program.tasks[0].members[0] else {
            panic!("expected step");
        };
        assert!(matches!(&step.body[1], Stmt::While { .. }));
    }

    #[test]
    fn test_expression_precedence() {
        let program = parse_ok(
            r#"
            objective "Test"
            task "Math":
                step "Calc":
                    x = 1 + 2 * 3
            run "Math"
            "#,
        );

        let TaskMember::Step(step) = &program.tasks[0].members[0] else {
            panic!("expected step");
        };
        let Stmt::Assignment { value, .. } = &step.body[0] else {
            panic!("expected assignment");
        };
        // Multiplication binds tighter: 1 + (2 * 3)
        let Expr::Binary {
            operator: BinaryOp::Add,
            right,
            ..
        } = value
        else {
            panic!("expected addition at top, got {:?}", value);
        };
        assert!(matches!(
            right.as_ref(),
            Expr::Binary {
                operator: BinaryOp::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn test_comparison_below_additive() {
        let program = parse_ok(
            r#"
            objective "Test"
            task "Math":
                step "Calc":
                    ok = a + 1 > b * 2
            run "Math"
            "#,
        );

        let TaskMember::Step(step) = &program.tasks[0].members[0] else {
            panic!("expected step");
        };
        let Stmt::Assignment { value, .. } = &step.body[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            value,
            Expr::Binary {
                operator: BinaryOp::Greater,
                ..
            }
        ));
    }

    #[test]
    fn test_call_parses_uniformly() {
        // Builtin and subtask calls are indistinguishable to the parser
        let program = parse_ok(
            r#"
            objective "Test"
            task "Calls":
                step "Go":
                    total = sum(scores)
                    avg = calculate_average()
                    print(avg)
            run "Calls"
            "#,
        );

        let TaskMember::Step(step) = &program.tasks[0].members[0] else {
            panic!("expected step");
        };
        let Stmt::Assignment { value, .. } = &step.body[1] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            value,
            Expr::Call { name, .. } if name == "calculate_average"
        ));
        assert!(matches!(&step.body[2], Stmt::Expression { .. }));
    }

    #[test]
    fn test_nested_structures_and_chained_indexing() {
        let program = parse_ok(
            r#"
            objective "Test"
            task "Data":
                step "Build":
                    users = [{"name": "Alice", "scores": [90, 85]}]
                    first = users[0]["name"]
            run "Data"
            "#,
        );

        let TaskMember::Step(step) = &program.tasks[0].members[0] else {
            panic!("expected step");
        };
        let Stmt::Assignment { value, .. } = &step.body[1] else {
            panic!("expected assignment");
        };
        let Expr::Index { base, .. } = value else {
            panic!("expected index expression");
        };
        assert!(matches!(base.as_ref(), Expr::Index { .. }));
    }

    #[test]
    fn test_return_without_value() {
        let program = parse_ok(
            r#"
            objective "Test"
            task "T":
                subtask "Nothing":
                    return
            run "T"
            "#,
        );

        let TaskMember::Subtask(subtask) = &program.tasks[0].members[0] else {
            panic!("expected subtask");
        };
        assert!(matches!(&subtask.body[0], Stmt::Return { value: None, .. }));
    }

    #[test]
    fn test_empty_task_is_parse_error() {
        let result = parse_source(
            r#"
            objective "Test"
            task "Empty":
            run "Empty"
            "#,
        );

        let err = result.unwrap_err();
        assert!(err.message().contains("step"));
    }

    #[test]
    fn test_parse_error_carries_position() {
        let result = parse_source("objective \"x\"\ntask 42:\n");
        let err = result.unwrap_err();
        let location = err.location().expect("parse errors carry a location");
        assert_eq!(location.line, 2);
    }
}
