pub fn render_password_reset(reset_url: &str, ttl_minutes: i64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>Reset your password</h2>
    <p>Someone asked to reset the password on your Bullpen account. If that was you, use the button below to choose a new one.</p>
    <p><a href="{reset_url}" style="display: inline-block; padding: 10px 20px; background: #c8102e; color: white; text-decoration: none; border-radius: 4px;">Choose a new password</a></p>
    <p style="color: #666; font-size: 14px;">This link works once and expires in {ttl_minutes} minutes. If you didn't ask for a reset, you can ignore this email and your password will stay the same.</p>
</body>
</html>"#
    )
}
