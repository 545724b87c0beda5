//! Recursive-descent, precedence-climbing parser: one `parse_*` method per
//! precedence level, chained low to high exactly as spec §6 orders them and
//! as [`symterm_kernel::input_form`] renders them back. `;` and the three
//! assignment operators sit below expression precedence because they are
//! statement-level, not renderable infix forms.

use symterm_base::intern;
use symterm_kernel::expr::{Association, Expr, ObjectPayload};

use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::Token;

/// Parses `input` as a single program: `;`-separated statements folded into
/// a `CompoundStatement`, or the symbol `Null` for empty input.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = Lexer::new(input).tokenize()?;
    Parser::new(tokens).parse_program()
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    pub fn parse_program(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Eof) {
            return Ok(Expr::symbol("Null"));
        }
        let mut statements = vec![self.parse_statement()?];
        while self.match_token(&Token::Semicolon) {
            if self.check(&Token::Eof) {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        self.expect(&Token::Eof)?;
        if statements.len() == 1 {
            Ok(statements.into_iter().next().unwrap())
        } else {
            Ok(Expr::call("CompoundStatement", statements))
        }
    }

    /// `target = expr` / `target := expr` / `target =.`, else a plain
    /// expression. `target` is parsed once and reinterpreted by shape: a
    /// bare symbol, a pattern-headed compound (`f(x_)`), or one of the
    /// slice/index forms spec §4.8 gives an assignment lowering for.
    fn parse_statement(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_expression()?;
        if self.match_token(&Token::UnsetOp) {
            return unset_target(lhs);
        }
        if self.match_token(&Token::SetDelayed) {
            let rhs = self.parse_statement()?;
            return set_target(lhs, rhs, true);
        }
        if self.match_token(&Token::Assign) {
            let rhs = self.parse_statement()?;
            return set_target(lhs, rhs, false);
        }
        Ok(lhs)
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_rule()
    }

    /// `:` (precedence 2), right-associative.
    fn parse_rule(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_or()?;
        if self.match_token(&Token::Colon) {
            let rhs = self.parse_rule()?;
            return Ok(Expr::call("Rule", vec![lhs, rhs]));
        }
        Ok(lhs)
    }

    /// `||` (precedence 3), left-associative.
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.match_token(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::call("Or", vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    /// `&&` (precedence 4), left-associative.
    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.match_token(&Token::And) {
            let rhs = self.parse_equality()?;
            lhs = Expr::call("And", vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    /// `== != === =!=` (precedence 5), left-associative.
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_comparison()?;
        loop {
            let head = match self.peek() {
                Token::Equal => "Equal",
                Token::Unequal => "Unequal",
                Token::SameQ => "SameQ",
                Token::UnsameQ => "UnsameQ",
                _ => break,
            };
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = Expr::call(head, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    /// `< > <= >=` (precedence 6), left-associative.
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let head = match self.peek() {
                Token::Less => "Less",
                Token::Greater => "Greater",
                Token::LessEqual => "LessEqual",
                Token::GreaterEqual => "GreaterEqual",
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::call(head, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    /// `+ -` (precedence 7), left-associative.
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let head = match self.peek() {
                Token::Plus => "Plus",
                Token::Minus => "Subtract",
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::call(head, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    /// `* /` (precedence 8), left-associative.
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let head = match self.peek() {
                Token::Star => "Times",
                Token::Slash => "Divide",
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::call(head, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    /// Unary `+ - !` (precedence 9), prefix, right-recursive into itself so
    /// `--x` and `!!x` stack. Unary `+` is a no-op: it parses and discards
    /// itself rather than wrapping the operand in anything.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.match_token(&Token::Plus) {
            return self.parse_unary();
        }
        if self.match_token(&Token::Minus) {
            let inner = self.parse_unary()?;
            return Ok(Expr::call("Minus", vec![inner]));
        }
        if self.match_token(&Token::Bang) {
            let inner = self.parse_unary()?;
            return Ok(Expr::call("Not", vec![inner]));
        }
        self.parse_power()
    }

    /// `^` (precedence 10), right-associative, binding tighter than unary so
    /// `-x^2` parses as `-(x^2)` per spec §6.
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;
        if self.match_token(&Token::Caret) {
            let exponent = self.parse_unary()?;
            return Ok(Expr::call("Power", vec![base, exponent]));
        }
        Ok(base)
    }

    /// Postfix `[` `]`: index, range-slice, or one-sided slices, chained
    /// left-to-right (`x[1][2]` indexes twice).
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.match_token(&Token::LeftBracket) {
            expr = self.parse_bracket_contents(expr)?;
        }
        Ok(expr)
    }

    fn parse_bracket_contents(&mut self, container: Expr) -> Result<Expr, ParseError> {
        if self.match_token(&Token::Colon) {
            // `x[:n]`
            let n = self.parse_expression()?;
            self.expect(&Token::RightBracket)?;
            return Ok(Expr::call("Take", vec![container, n]));
        }
        let first = self.parse_expression()?;
        if self.match_token(&Token::Colon) {
            if self.match_token(&Token::RightBracket) {
                // `x[a:]`
                return Ok(Expr::call("TakeFrom", vec![container, first]));
            }
            let second = self.parse_expression()?;
            self.expect(&Token::RightBracket)?;
            return Ok(Expr::call("SliceRange", vec![container, first, second]));
        }
        self.expect(&Token::RightBracket)?;
        Ok(Expr::call("Part", vec![container, first]))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::Integer(v) => {
                self.advance();
                Ok(Expr::integer(v))
            }
            Token::Real(v) => {
                self.advance();
                Ok(Expr::real(v))
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::string(s))
            }
            Token::Blank1 => {
                self.advance();
                Ok(Expr::call("Blank", self.parse_blank_type()))
            }
            Token::Blank2 => {
                self.advance();
                Ok(Expr::call("BlankSequence", self.parse_blank_type()))
            }
            Token::Blank3 => {
                self.advance();
                Ok(Expr::call("BlankNullSequence", self.parse_blank_type()))
            }
            Token::Identifier(name) => {
                self.advance();
                self.parse_identifier_led(name)
            }
            Token::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(inner)
            }
            Token::LeftBracket => {
                self.advance();
                self.parse_list_literal()
            }
            Token::LeftBrace => {
                self.advance();
                self.parse_association_literal()
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "an expression".to_string(),
                found: format!("{other:?}"),
            }),
        }
    }

    /// A named pattern variable immediately followed by a blank
    /// (`x_`, `x__`, `x___`, each optionally typed) is `Pattern(x, Blank...)`;
    /// an identifier followed by `(` is a call; otherwise a bare symbol.
    fn parse_identifier_led(&mut self, name: String) -> Result<Expr, ParseError> {
        let blank_head = match self.peek() {
            Token::Blank1 => Some("Blank"),
            Token::Blank2 => Some("BlankSequence"),
            Token::Blank3 => Some("BlankNullSequence"),
            _ => None,
        };
        if let Some(head) = blank_head {
            self.advance();
            let blank = Expr::call(head, self.parse_blank_type());
            return Ok(Expr::call("Pattern", vec![Expr::symbol(&name), blank]));
        }
        if self.match_token(&Token::LeftParen) {
            let args = self.parse_call_args()?;
            return Ok(Expr::compound(Expr::from_symbol(intern(&name)), args));
        }
        Ok(Expr::symbol(&name))
    }

    /// A blank's optional trailing type name: `x_Integer` reads the
    /// identifier immediately following the blank token, if any.
    fn parse_blank_type(&mut self) -> Vec<Expr> {
        if let Token::Identifier(ty) = self.peek().clone() {
            self.advance();
            vec![Expr::symbol(&ty)]
        } else {
            vec![]
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.match_token(&Token::RightParen) {
            return Ok(args);
        }
        args.push(self.parse_expression()?);
        while self.match_token(&Token::Comma) {
            args.push(self.parse_expression()?);
        }
        self.expect(&Token::RightParen)?;
        Ok(args)
    }

    fn parse_list_literal(&mut self) -> Result<Expr, ParseError> {
        let mut items = Vec::new();
        if self.match_token(&Token::RightBracket) {
            return Ok(Expr::list(items));
        }
        items.push(self.parse_expression()?);
        while self.match_token(&Token::Comma) {
            items.push(self.parse_expression()?);
        }
        self.expect(&Token::RightBracket)?;
        Ok(Expr::list(items))
    }

    fn parse_association_literal(&mut self) -> Result<Expr, ParseError> {
        let mut assoc = Association::new();
        if self.match_token(&Token::RightBrace) {
            return Ok(make_association(assoc));
        }
        loop {
            let key = self.parse_expression()?;
            self.expect(&Token::Colon)?;
            let value = self.parse_expression()?;
            assoc.insert(key, value);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RightBrace)?;
        Ok(make_association(assoc))
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens.get(self.current).cloned().unwrap_or(Token::Eof);
        if self.current < self.tokens.len() {
            self.current += 1;
        }
        t
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek() == expected
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ParseError> {
        if self.match_token(expected) {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken { expected: format!("{expected:?}"), found: format!("{:?}", self.peek()) })
        }
    }
}

fn make_association(assoc: Association) -> Expr {
    Expr::object(intern("Association"), ObjectPayload::Association(assoc))
}

/// Reinterprets a parsed left-hand side as a `Set`/`SetDelayed` target, or
/// lowers it to `PartSet`/`SliceSet` when it is one of the slice forms spec
/// §4.8 gives an assignment reading for.
fn set_target(lhs: Expr, rhs: Expr, delayed: bool) -> Result<Expr, ParseError> {
    if let Some(lowered) = lower_slice_assignment(&lhs, &rhs)? {
        if delayed {
            return Err(ParseError::UnsupportedAssignmentTarget(format!("{lhs:?}")));
        }
        return Ok(lowered);
    }
    let head_name = if delayed { "SetDelayed" } else { "Set" };
    Ok(Expr::call(head_name, vec![lhs, rhs]))
}

fn unset_target(lhs: Expr) -> Result<Expr, ParseError> {
    if lower_slice_assignment(&lhs, &Expr::symbol("Null"))?.is_some() {
        return Err(ParseError::UnsupportedAssignmentTarget(format!("{lhs:?}")));
    }
    Ok(Expr::call("Unset", vec![lhs]))
}

/// `None` if `lhs` isn't a recognized slice/index call at all (an ordinary
/// `Set`/`SetDelayed` target); `Some(Err(..))` if it is one but spec §4.8
/// gives it no assignment form (`x[:n] = v`); `Some(Ok(..))` with the
/// lowered `PartSet`/`SliceSet` call otherwise.
fn lower_slice_assignment(lhs: &Expr, rhs: &Expr) -> Result<Option<Expr>, ParseError> {
    let Some(c) = lhs.as_compound() else { return Ok(None) };
    let Some(head) = c.elements[0].as_symbol() else { return Ok(None) };
    let args = &c.elements[1..];
    match (symterm_base::resolve(head).as_ref(), args) {
        ("Part", [container, index]) => {
            Ok(Some(Expr::call("PartSet", vec![container.clone(), index.clone(), rhs.clone()])))
        }
        ("SliceRange", [container, a, b]) => {
            Ok(Some(Expr::call("SliceSet", vec![container.clone(), a.clone(), b.clone(), rhs.clone()])))
        }
        ("TakeFrom", [container, a]) => {
            Ok(Some(Expr::call("SliceSet", vec![container.clone(), a.clone(), Expr::integer(-1), rhs.clone()])))
        }
        ("Take", _) => Err(ParseError::UnsupportedAssignmentTarget("x[:n]".to_string())),
        _ => Ok(None),
    }
}
